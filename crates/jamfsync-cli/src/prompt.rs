//! Interactive credential provider.
//!
//! Resolution order: `JAMF_*` environment variables, then the saved config
//! plus the OS keychain, then prompting on the terminal. Whatever was typed is
//! remembered: server/account in the config file, the secret in the keychain.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use jamfsync_core::auth::{Credential, CredentialProvider, CredentialStore, EnvCredentials};
use jamfsync_core::config::{AuthMethod, Config};
use tracing::warn;

pub struct InteractiveCredentials {
    config: Config,
    server: Option<String>,
    account: Option<String>,
    method: Option<AuthMethod>,
}

impl InteractiveCredentials {
    pub fn new(
        config: Config,
        server: Option<String>,
        account: Option<String>,
        method: Option<AuthMethod>,
    ) -> Self {
        Self {
            config,
            server,
            account,
            method,
        }
    }

    fn resolve(&mut self) -> Result<Credential> {
        let server = match self.server.clone().or_else(|| self.config.server.clone()) {
            Some(server) => server,
            None => prompt_line("Jamf Pro server URL: ")?,
        };
        let method = self
            .method
            .or(self.config.auth_method)
            .unwrap_or(AuthMethod::Basic);

        // A remembered account only applies to the method it was saved with.
        let remembered = match self.config.auth_method {
            Some(saved) if saved == method => self.config.account.clone(),
            _ => None,
        };
        let account = match self.account.clone().or(remembered) {
            Some(account) => account,
            None => prompt_line(match method {
                AuthMethod::Basic => "Username: ",
                AuthMethod::OAuth => "Client ID: ",
            })?,
        };

        let secret = match CredentialStore::get_secret(&account, &server) {
            Ok(secret) => {
                eprintln!("Secret of {} characters found in keychain", secret.len());
                secret
            }
            Err(_) => {
                let secret = rpassword::prompt_password(match method {
                    AuthMethod::Basic => "Password: ",
                    AuthMethod::OAuth => "Client secret: ",
                })
                .context("Failed to read secret")?;
                if secret.is_empty() {
                    bail!("A secret is required");
                }
                if let Err(e) = CredentialStore::store(&account, &server, &secret) {
                    warn!(error = %e, "Could not save secret to keychain");
                }
                secret
            }
        };

        self.config.server = Some(server.clone());
        self.config.auth_method = Some(method);
        self.config.account = Some(account.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Could not save config");
        }

        Ok(match method {
            AuthMethod::Basic => Credential::Basic {
                username: account,
                password: secret,
                server,
            },
            AuthMethod::OAuth => Credential::OAuth {
                client_id: account,
                client_secret: secret,
                server,
            },
        })
    }
}

impl CredentialProvider for InteractiveCredentials {
    fn credential(&mut self) -> Option<Credential> {
        if let Some(credential) = EnvCredentials.credential() {
            return Some(credential);
        }
        match self.resolve() {
            Ok(credential) => Some(credential),
            Err(e) => {
                eprintln!("{:#}", e);
                None
            }
        }
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        bail!("{} is required", prompt.trim().trim_end_matches(':'));
    }
    Ok(value)
}
