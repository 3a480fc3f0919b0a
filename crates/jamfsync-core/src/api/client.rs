//! Authenticated client for the Jamf Pro Classic and Pro APIs.
//!
//! `JamfClient` pairs a `reqwest::Client` with the [`Session`] that stamps
//! every request with a live bearer token, and implements the generic
//! list / detail / update operations over any [`Resource`].

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, Url};
use tracing::debug;

use crate::auth::Session;

use super::decode::{decode_envelope, decode_list_envelope};
use super::error::{JamfError, Result};
use super::resource::{DetailResource, Resource, UpdatableResource};

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Join `server`, `path` and `suffix` into an absolute URL.
///
/// `server` must itself be an absolute URL with a host; a trailing slash on
/// it is ignored.
pub fn build_url(server: &str, path: &str, suffix: &str) -> Result<Url> {
    let base =
        Url::parse(server).map_err(|_| JamfError::UrlConstructionFailed(server.to_string()))?;
    if base.cannot_be_a_base() || base.host_str().is_none() {
        return Err(JamfError::UrlConstructionFailed(server.to_string()));
    }

    let joined = format!("{}{}{}", server.trim_end_matches('/'), path, suffix);
    Url::parse(&joined).map_err(|_| JamfError::UrlConstructionFailed(joined))
}

/// Execute a request and return the body of a 2xx response.
pub(crate) async fn send(http: &Client, request: RequestBuilder) -> Result<Vec<u8>> {
    let request = request.build().map_err(JamfError::ConnectionFailure)?;
    let url = request.url().to_string();
    let method = request.method().clone();

    let response = http
        .execute(request)
        .await
        .map_err(JamfError::ConnectionFailure)?;

    let status = response.status();
    debug!(method = %method, url = %url, status = %status, "Response received");
    if !status.is_success() {
        return Err(JamfError::InvalidHttpStatus {
            status: status.as_u16(),
            url,
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(JamfError::ConnectionFailure)?;
    Ok(body.to_vec())
}

pub struct JamfClient {
    http: Client,
    session: Session,
}

impl JamfClient {
    pub fn new(session: Session) -> Result<Self> {
        Self::with_timeout(session, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(session: Session, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(JamfError::ConnectionFailure)?;
        Ok(Self { http, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn ensure_authenticated(&mut self) -> Result<()> {
        self.session.ensure_authenticated(&self.http).await
    }

    /// Invalidate the current token. Never fails.
    pub async fn logout(&mut self) {
        self.session.expire(&self.http).await;
    }

    /// Ensure a live token and return `(server, token)` for the next request.
    async fn authorize(&mut self) -> Result<(String, String)> {
        self.ensure_authenticated().await?;
        match (self.session.current_server(), self.session.current_token()) {
            (Some(server), Some(token)) => Ok((server.to_string(), token.to_string())),
            _ => Err(JamfError::NoCredentials),
        }
    }

    pub fn build_get_request(&self, url: Url, token: &str) -> RequestBuilder {
        self.http
            .get(url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
    }

    /// A PUT carrying `body` verbatim.
    pub fn build_put_request(&self, url: Url, token: &str, body: String) -> RequestBuilder {
        self.http
            .put(url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/xml")
            .body(body)
    }

    pub async fn fetch(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        send(&self.http, request).await
    }

    /// Fetch every entry of `R`.
    pub async fn list_all<R: Resource>(&mut self) -> Result<Vec<R::Entry>> {
        let (server, token) = self.authorize().await?;
        let url = build_url(&server, R::PATH, "")?;
        debug!(resource = R::LABEL, url = %url, "Listing");

        let body = self.fetch(self.build_get_request(url, &token)).await?;
        Ok(decode_list_envelope(&body, R::LIST_KEY)?)
    }

    /// Fetch the full record of `R` with the given id.
    pub async fn get_one<R: DetailResource>(&mut self, id: &str) -> Result<R::Detail> {
        let (server, token) = self.authorize().await?;
        let url = build_url(&server, R::PATH, &format!("/id/{}", id))?;

        let body = self.fetch(self.build_get_request(url, &token)).await?;
        Ok(decode_envelope(&body, R::DETAIL_KEY)?)
    }

    /// PUT an XML document to the record of `R` with the given id.
    /// Any 2xx is success; the response body is discarded.
    pub async fn update_one<R: UpdatableResource>(&mut self, id: &str, body: String) -> Result<()> {
        let (server, token) = self.authorize().await?;
        let url = build_url(&server, R::PATH, &format!("/id/{}", id))?;
        debug!(resource = R::LABEL, url = %url, "Updating");

        self.fetch(self.build_put_request(url, &token, body)).await?;
        Ok(())
    }
}
