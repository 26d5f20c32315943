pub mod client_secrets;
pub mod consent;
pub mod credentials;
pub mod endpoints;
pub mod service;

pub use client_secrets::ClientSecrets;
pub use consent::{ConsentFlow, LoopbackConsent};
pub use credentials::GoogleCredential;
pub use service::Authenticator;
