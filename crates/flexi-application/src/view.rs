//! What the application asks of the presentation layer.

use flexi_core::marketplace::{Contract, Job, JobCategory, Payment};
use flexi_core::messaging::Conversation;
use flexi_core::navigation::PageId;
use flexi_core::user::User;
use serde_json::{Map, Value};

use crate::dashboard::Dashboard;
use crate::jobs_service::JobDetail;
use crate::preferences::Theme;

/// Renders page content and the chrome around it.
pub trait PageView: Send + Sync {
    /// Job list of the home page (recent jobs) or the jobs page (search results).
    fn render_jobs(&self, page: PageId, jobs: &[Job]);

    fn render_job_detail(&self, detail: &JobDetail);

    fn render_dashboard(&self, dashboard: &Dashboard);

    fn render_conversations(&self, conversations: &[Conversation], me: &User);

    fn render_profile(&self, user: &User);

    fn render_settings(&self, theme: Theme);

    fn render_contract(&self, contract: &Contract);

    /// Payments received by the signed-in freelancer.
    fn render_earnings(&self, payments: &[Payment]);

    /// Shows the post-job form with its category choices.
    fn show_post_job_form(&self, categories: &[JobCategory]);

    /// Fills `form` back in from a saved draft.
    fn restore_draft(&self, _form: &str, _fields: &Map<String, Value>) {}

    /// Shows the login form.
    fn show_login_prompt(&self);

    /// Redraws the signed-in/anonymous navigation and user menu.
    fn refresh_auth_chrome(&self, user: Option<&User>);

    fn apply_theme(&self, theme: Theme);

    fn close_modals(&self) {}
}
