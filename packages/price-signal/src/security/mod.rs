//! Credential handling for collaborator API keys.

pub mod credentials;

pub use credentials::{ApiKey, ServiceCredentials};
