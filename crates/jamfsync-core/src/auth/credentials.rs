use std::fmt;

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "jamfsync";

/// Environment variables read by [`EnvCredentials`].
pub const ENV_SERVER: &str = "JAMF_URL";
pub const ENV_USERNAME: &str = "JAMF_USERNAME";
pub const ENV_PASSWORD: &str = "JAMF_PASSWORD";
pub const ENV_CLIENT_ID: &str = "JAMF_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "JAMF_CLIENT_SECRET";

/// Credentials for one Jamf Pro server.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Basic {
        username: String,
        password: String,
        server: String,
    },
    OAuth {
        client_id: String,
        client_secret: String,
        server: String,
    },
}

impl Credential {
    pub fn server(&self) -> &str {
        match self {
            Credential::Basic { server, .. } | Credential::OAuth { server, .. } => server,
        }
    }

    /// Username or client id.
    pub fn account(&self) -> &str {
        match self {
            Credential::Basic { username, .. } => username,
            Credential::OAuth { client_id, .. } => client_id,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Basic {
                username, server, ..
            } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("server", server)
                .finish(),
            Credential::OAuth {
                client_id, server, ..
            } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("server", server)
                .finish(),
        }
    }
}

/// Supplies credentials to a [`Session`](super::Session) on first need.
pub trait CredentialProvider {
    fn credential(&mut self) -> Option<Credential>;
}

impl CredentialProvider for Option<Credential> {
    fn credential(&mut self) -> Option<Credential> {
        self.take()
    }
}

/// Reads credentials from `JAMF_*` environment variables.
///
/// OAuth client credentials win when both pairs are set.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl EnvCredentials {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Credential> {
        let server = lookup(ENV_SERVER).filter(|s| !s.is_empty())?;

        if let (Some(client_id), Some(client_secret)) =
            (lookup(ENV_CLIENT_ID), lookup(ENV_CLIENT_SECRET))
        {
            return Some(Credential::OAuth {
                client_id,
                client_secret,
                server,
            });
        }

        match (lookup(ENV_USERNAME), lookup(ENV_PASSWORD)) {
            (Some(username), Some(password)) => Some(Credential::Basic {
                username,
                password,
                server,
            }),
            _ => None,
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn credential(&mut self) -> Option<Credential> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Secrets (passwords, client secrets) in the OS keychain, keyed by
/// `account@server`.
pub struct CredentialStore;

impl CredentialStore {
    fn entry(account: &str, server: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &format!("{}@{}", account, server))
            .context("Failed to create keyring entry")
    }

    /// Store a secret in the OS keychain
    pub fn store(account: &str, server: &str, secret: &str) -> Result<()> {
        Self::entry(account, server)?
            .set_password(secret)
            .context("Failed to store secret in keychain")?;
        Ok(())
    }

    /// Retrieve the secret for an account from the OS keychain
    pub fn get_secret(account: &str, server: &str) -> Result<String> {
        Self::entry(account, server)?
            .get_password()
            .context("Failed to retrieve secret from keychain")
    }

    /// Delete the stored secret for an account
    pub fn delete(account: &str, server: &str) -> Result<()> {
        Self::entry(account, server)?
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }
}
