//! Generic object access for the Jamf Pro API.
//!
//! This module provides the `JamfClient` for listing, fetching and updating
//! resources, the per-resource definitions it is parametrized with, and the
//! error taxonomy shared by the auth session and every endpoint.

pub mod client;
pub mod decode;
pub mod error;
pub mod resource;

pub use client::{build_url, JamfClient, REQUEST_TIMEOUT_SECS};
pub use error::{DecodeError, JamfError, Result};
pub use resource::{
    Categories, Computers, DetailResource, MobileDevices, Resource, UpdatableResource,
};
