//! Jamf Pro automation core.
//!
//! Authenticates against a Jamf Pro server, lists and fetches managed
//! devices, and keeps a "Jamf Site" extension attribute in step with each
//! device's assigned site.
//!
//! - [`auth`]: credentials and the bearer token session
//! - [`api`]: generic list / detail / update operations and their errors
//! - [`models`]: device and category payloads
//! - [`reconcile`]: the site reconciliation loop
//! - [`xml`]: update document builder
//! - [`config`]: persisted user configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod reconcile;
pub mod xml;

pub use api::{JamfClient, JamfError};
pub use auth::{Credential, Session};
