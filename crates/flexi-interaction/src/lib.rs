//! Remote access to the FlexiLance backend.

pub mod error_normalizer;
pub mod http_gateway;

pub use error_normalizer::normalize_error_message;
pub use http_gateway::HttpGateway;
