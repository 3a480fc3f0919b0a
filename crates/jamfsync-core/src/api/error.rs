use thiserror::Error;

/// Errors raised by the auth session and the endpoint contract.
///
/// Callers only need to tell the kinds apart; decode failures are flattened
/// into a single human-readable `Decode` message.
#[derive(Error, Debug)]
pub enum JamfError {
    #[error("No credentials available")]
    NoCredentials,

    #[error("Connection failure: {0}")]
    ConnectionFailure(#[source] reqwest::Error),

    #[error("Invalid HTTP status {status} from {url}")]
    InvalidHttpStatus { status: u16, url: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Could not construct a URL from {0}")]
    UrlConstructionFailed(String),

    #[error("Invalid token expiry date: {0}")]
    InvalidDateFormat(String),
}

impl From<DecodeError> for JamfError {
    fn from(err: DecodeError) -> Self {
        JamfError::Decode(err.to_string())
    }
}

/// Why a response body could not be decoded.
///
/// Paths use a JSONPath-like notation rooted at `$`, e.g. `$.computers[3]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{path}: data corrupted: {detail}")]
    Corrupted { path: String, detail: String },

    #[error("{path}: key `{key}` not found")]
    KeyNotFound { key: String, path: String },

    #[error("{path}: value not found, expected {expected}")]
    ValueNotFound { path: String, expected: String },

    #[error("{path}: type mismatch, expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        path: String,
    },

    #[error("{path}: {detail}")]
    Other { path: String, detail: String },
}

pub type Result<T> = std::result::Result<T, JamfError>;
