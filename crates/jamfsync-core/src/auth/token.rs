//! Token exchange and invalidation against the Jamf Pro auth endpoints.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::client::send;
use crate::api::decode::decode_body;
use crate::api::{build_url, DecodeError, JamfError, Result};

use super::Credential;

const BASIC_TOKEN_PATH: &str = "/api/v1/auth/token";
const OAUTH_TOKEN_PATH: &str = "/api/oauth/token";
const INVALIDATE_TOKEN_PATH: &str = "/api/v1/auth/invalidate-token";

/// Subtracted from the server-reported expiry so the token is treated as
/// expired before the server starts rejecting it.
pub const TOKEN_REFRESH_BUFFER_MINUTES: i64 = 5;

/// `yyyy-MM-dd'T'HH:mm:ss.SSSZ` with a numeric offset, e.g. `+0000`.
const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// A bearer token and the instant (already buffered) after which it must not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct BasicTokenResponse {
    token: String,
    expires: String,
}

#[derive(Serialize)]
struct OAuthTokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Exchange a credential for a bearer token.
pub async fn request_token(http: &Client, credential: &Credential) -> Result<BearerToken> {
    match credential {
        Credential::Basic {
            username,
            password,
            server,
        } => request_basic_token(http, server, username, password).await,
        Credential::OAuth {
            client_id,
            client_secret,
            server,
        } => request_oauth_token(http, server, client_id, client_secret).await,
    }
}

async fn request_basic_token(
    http: &Client,
    server: &str,
    username: &str,
    password: &str,
) -> Result<BearerToken> {
    let url = build_url(server, BASIC_TOKEN_PATH, "")?;
    debug!(url = %url, "Requesting token with basic auth");

    let request = http
        .post(url)
        .basic_auth(username, Some(password))
        .header(header::ACCEPT, "application/json");
    let body = send(http, request).await?;

    let response: BasicTokenResponse = decode_body(&body)?;
    require_token(&response.token, "$.token")?;
    let expires_at = parse_expiry(&response.expires)?
        .checked_sub_signed(refresh_buffer())
        .ok_or_else(|| JamfError::InvalidDateFormat(response.expires.clone()))?;
    info!(expires_at = %expires_at, "Obtained basic auth token");

    Ok(BearerToken {
        value: response.token,
        expires_at,
    })
}

async fn request_oauth_token(
    http: &Client,
    server: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<BearerToken> {
    let url = build_url(server, OAUTH_TOKEN_PATH, "")?;
    debug!(url = %url, "Requesting token with client credentials");

    let form = OAuthTokenRequest {
        grant_type: "client_credentials",
        client_id,
        client_secret,
    };
    let request = http
        .post(url)
        .form(&form)
        .header(header::ACCEPT, "application/json");
    let body = send(http, request).await?;

    let response: OAuthTokenResponse = decode_body(&body)?;
    require_token(&response.access_token, "$.access_token")?;
    let expires_at = oauth_expiry(Utc::now(), response.expires_in)?;
    info!(expires_at = %expires_at, "Obtained OAuth access token");

    Ok(BearerToken {
        value: response.access_token,
        expires_at,
    })
}

/// Ask the server to invalidate `token`. The outcome is ignored.
pub async fn invalidate_token(http: &Client, server: &str, token: &str) {
    let Ok(url) = build_url(server, INVALIDATE_TOKEN_PATH, "") else {
        return;
    };
    match http.post(url).bearer_auth(token).send().await {
        Ok(response) => debug!(status = %response.status(), "Token invalidation sent"),
        Err(e) => debug!(error = %e, "Token invalidation request failed"),
    }
}

/// Parse the `expires` timestamp of a basic-auth token response.
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, EXPIRY_FORMAT) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Some servers omit the offset entirely; those timestamps are UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| JamfError::InvalidDateFormat(raw.to_string()))
}

/// `now + expires_in`, less the refresh buffer. Lifetimes chrono cannot
/// represent are a decode error rather than a panic.
fn oauth_expiry(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .and_then(|expiry| expiry.checked_sub_signed(refresh_buffer()))
        .ok_or_else(|| {
            DecodeError::Other {
                path: "$.expires_in".to_string(),
                detail: format!("token lifetime of {} seconds is out of range", expires_in),
            }
            .into()
        })
}

fn require_token(value: &str, path: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DecodeError::ValueNotFound {
            path: path.to_string(),
            expected: "a non-empty token".to_string(),
        }
        .into());
    }
    Ok(())
}

fn refresh_buffer() -> Duration {
    Duration::minutes(TOKEN_REFRESH_BUFFER_MINUTES)
}
