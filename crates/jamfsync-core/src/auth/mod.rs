//! Authentication for the Jamf Pro API.
//!
//! This module provides:
//! - `Session`: bearer token lifecycle with proactive expiry
//! - `Credential`, `CredentialProvider`: basic or OAuth client credentials
//! - `CredentialStore`: secret storage in the OS keychain via keyring
//!
//! Tokens are treated as expired five minutes before the server says so.

pub mod credentials;
pub mod session;
pub mod token;

pub use credentials::{Credential, CredentialProvider, CredentialStore, EnvCredentials};
pub use session::Session;
pub use token::{BearerToken, TOKEN_REFRESH_BUFFER_MINUTES};
