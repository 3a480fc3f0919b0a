use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, warn};

use crate::api::{JamfError, Result};

use super::token::{invalidate_token, request_token, BearerToken};
use super::{Credential, CredentialProvider};

/// Owns the credential and bearer token for one Jamf Pro server.
///
/// Token and expiry live in a single `Option<BearerToken>` so they are always
/// set and cleared together. A session is meant to be driven by one caller at
/// a time; all mutation goes through `&mut self`.
pub struct Session {
    credential: Option<Credential>,
    token: Option<BearerToken>,
    provider: Option<Box<dyn CredentialProvider + Send>>,
}

impl Session {
    /// A session with no credential and no provider.
    pub fn new() -> Self {
        Self {
            credential: None,
            token: None,
            provider: None,
        }
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
            ..Self::new()
        }
    }

    /// A session that asks `provider` for a credential on first need.
    pub fn with_provider(provider: impl CredentialProvider + Send + 'static) -> Self {
        Self {
            provider: Some(Box::new(provider)),
            ..Self::new()
        }
    }

    /// Replace the credential, dropping any token issued for the old one.
    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
        self.token = None;
    }

    /// Make sure a live token is available, exchanging the credential for a
    /// new one only when the current token is missing or expired.
    ///
    /// Any failure clears the credential, token and expiry.
    pub async fn ensure_authenticated(&mut self, http: &Client) -> Result<()> {
        if self.credential.is_none() {
            self.credential = self.provider.as_mut().and_then(|p| p.credential());
        }
        let Some(credential) = self.credential.as_ref() else {
            return Err(JamfError::NoCredentials);
        };

        if self.is_valid() {
            return Ok(());
        }

        debug!(server = credential.server(), "Token missing or expired, requesting a new one");
        match request_token(http, credential).await {
            Ok(token) => {
                self.token = Some(token);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Token exchange failed");
                self.clear();
                Err(e)
            }
        }
    }

    /// True iff a credential and a token are present and the token has not expired.
    pub fn is_valid(&self) -> bool {
        match (&self.credential, &self.token) {
            (Some(_), Some(token)) => token.expires_at >= Utc::now(),
            _ => false,
        }
    }

    /// Invalidate the token server-side (best effort) and drop it locally.
    ///
    /// Never fails; local state is cleared whatever the server says.
    pub async fn expire(&mut self, http: &Client) {
        if let (Some(token), Some(credential)) = (self.token.take(), self.credential.as_ref()) {
            invalidate_token(http, credential.server(), &token.value).await;
        }
        self.token = None;
    }

    pub fn current_token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.value.as_str())
    }

    pub fn current_server(&self) -> Option<&str> {
        self.credential.as_ref().map(Credential::server)
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.token.as_ref().map(|t| t.expires_at)
    }

    fn clear(&mut self) {
        self.credential = None;
        self.token = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn credential() -> Credential {
        Credential::Basic {
            username: "admin".to_string(),
            password: "pw".to_string(),
            server: "https://example.jamfcloud.com".to_string(),
        }
    }

    fn token(expires_at: DateTime<Utc>) -> BearerToken {
        BearerToken {
            value: "abc".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_new_session_is_invalid() {
        let session = Session::new();
        assert!(!session.is_valid());
        assert!(session.current_token().is_none());
        assert!(session.current_server().is_none());
    }

    #[test]
    fn test_valid_with_future_expiry() {
        let mut session = Session::with_credential(credential());
        session.token = Some(token(Utc::now() + Duration::minutes(10)));
        assert!(session.is_valid());
        assert_eq!(session.current_token(), Some("abc"));
        assert_eq!(session.current_server(), Some("https://example.jamfcloud.com"));
    }

    #[test]
    fn test_invalid_when_expired() {
        let mut session = Session::with_credential(credential());
        session.token = Some(token(Utc::now() - Duration::seconds(1)));
        assert!(!session.is_valid());
    }

    #[test]
    fn test_invalid_without_credential() {
        let mut session = Session::new();
        session.token = Some(token(Utc::now() + Duration::minutes(10)));
        assert!(!session.is_valid());
    }

    #[test]
    fn test_set_credential_drops_token() {
        let mut session = Session::with_credential(credential());
        session.token = Some(token(Utc::now() + Duration::minutes(10)));
        session.set_credential(credential());
        assert!(session.current_token().is_none());
        assert!(session.expires_at().is_none());
    }

    #[tokio::test]
    async fn test_ensure_without_credentials_fails() {
        let mut session = Session::new();
        let err = session
            .ensure_authenticated(&Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, JamfError::NoCredentials));
    }

    #[tokio::test]
    async fn test_ensure_reuses_valid_token_without_network() {
        // The server is unroutable; reaching the network would fail.
        let mut session = Session::with_credential(Credential::OAuth {
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            server: "http://127.0.0.1:9".to_string(),
        });
        session.token = Some(token(Utc::now() + Duration::minutes(10)));
        session.ensure_authenticated(&Client::new()).await.unwrap();
        assert_eq!(session.current_token(), Some("abc"));
    }

    #[tokio::test]
    async fn test_expire_without_token_is_noop() {
        let mut session = Session::with_credential(credential());
        session.expire(&Client::new()).await;
        assert!(session.current_token().is_none());
        assert_eq!(session.current_server(), Some("https://example.jamfcloud.com"));
    }
}
