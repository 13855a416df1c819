//! Application layer of the FlexiLance client.
//!
//! Use cases and page loaders that coordinate the core's session, router
//! and polling channel, and [`AppRoot`], which owns them all.

pub mod app_root;
pub mod auth_usecase;
pub mod dashboard;
pub mod jobs_service;
pub mod loaders;
pub mod messaging_service;
pub mod preferences;
pub mod view;

pub use app_root::{AppParts, AppRoot, UiEvent, UiEventKind};
pub use auth_usecase::AuthUseCase;
pub use dashboard::Dashboard;
pub use jobs_service::{JobDetail, JobsService};
pub use loaders::PageLoaders;
pub use messaging_service::MessagingService;
pub use view::PageView;
