pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod google_oauth;
pub mod http;
pub mod service;
pub mod types;

pub use error::{AuthError, FetchError, GsheetError};
pub use google_oauth::credentials::GoogleCredential;
pub use google_oauth::service::Authenticator;
pub use service::exporter::{ExportOutcome, Exporter};
