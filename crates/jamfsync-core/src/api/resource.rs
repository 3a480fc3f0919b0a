//! Per-resource endpoint definitions.
//!
//! Each resource type is a zero-sized marker that supplies the path and
//! envelope keys the generic operations in [`JamfClient`](super::JamfClient)
//! need. Mutability is opt-in through [`UpdatableResource`].

use serde::de::DeserializeOwned;

use crate::models::{Category, DeviceDetail, ListEntry};

/// A listable resource.
pub trait Resource {
    /// Path under the server root, e.g. `/JSSResource/computers`.
    const PATH: &'static str;
    /// Key wrapping the list array in the list response.
    const LIST_KEY: &'static str;
    /// Human-readable plural, used in logs and reports.
    const LABEL: &'static str;

    type Entry: DeserializeOwned;
}

/// A resource whose single records can be fetched at `{PATH}/id/{id}`.
pub trait DetailResource: Resource {
    /// Key wrapping the object in the detail response.
    const DETAIL_KEY: &'static str;

    type Detail: DeserializeOwned;
}

/// A resource that accepts XML updates at `{PATH}/id/{id}`.
pub trait UpdatableResource: DetailResource {
    /// Root element of the update document.
    const ROOT_TAG: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct Computers;

impl Resource for Computers {
    const PATH: &'static str = "/JSSResource/computers";
    const LIST_KEY: &'static str = "computers";
    const LABEL: &'static str = "computer objects";
    type Entry = ListEntry;
}

impl DetailResource for Computers {
    const DETAIL_KEY: &'static str = "computer";
    type Detail = DeviceDetail;
}

impl UpdatableResource for Computers {
    const ROOT_TAG: &'static str = "computer";
}

#[derive(Debug, Clone, Copy)]
pub struct MobileDevices;

impl Resource for MobileDevices {
    const PATH: &'static str = "/JSSResource/mobiledevices";
    const LIST_KEY: &'static str = "mobile_devices";
    const LABEL: &'static str = "mobile objects";
    type Entry = ListEntry;
}

impl DetailResource for MobileDevices {
    const DETAIL_KEY: &'static str = "mobile_device";
    type Detail = DeviceDetail;
}

impl UpdatableResource for MobileDevices {
    const ROOT_TAG: &'static str = "mobile_device";
}

/// Pro API categories. List only; `totalCount` in the envelope is ignored.
#[derive(Debug, Clone, Copy)]
pub struct Categories;

impl Resource for Categories {
    const PATH: &'static str = "/api/v1/categories";
    const LIST_KEY: &'static str = "results";
    const LABEL: &'static str = "categories";
    type Entry = Category;
}
