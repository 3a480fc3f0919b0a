//! Data models for Jamf Pro entities.
//!
//! - `ListEntry`: id/name projection used to enumerate devices
//! - `DeviceDetail`, `DeviceRecord`: full device payload and its reconciled view
//! - `Category`: read-only Pro API category

pub mod category;
pub mod device;

pub use category::Category;
pub use device::{DeviceDetail, DeviceRecord, ExtensionAttribute, General, ListEntry, Site};
