//! Device models shared by computers and mobile devices.
//!
//! The Classic API returns the same shape for both resource types as far as
//! this tool is concerned: a `general` block carrying id, name and site, plus
//! a flat `extension_attributes` array.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Lightweight projection used to enumerate a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

/// Detail payload from `/JSSResource/{computers,mobiledevices}/id/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceDetail {
    pub general: General,
    #[serde(default)]
    pub extension_attributes: Vec<ExtensionAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct General {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub site: Site,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionAttribute {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// The fields of a device that reconciliation cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub id: String,
    pub name: String,
    /// Authoritative site assigned by Jamf.
    pub site_name: String,
    /// Last-synced site mirrored into the extension attribute; empty if never set.
    pub ext_attribute_value: String,
}

impl DeviceDetail {
    /// Value of the named extension attribute, or `""` if absent.
    pub fn extension_value(&self, attribute: &str) -> &str {
        self.extension_attributes
            .iter()
            .find(|ext| ext.name == attribute)
            .and_then(|ext| ext.value.as_deref())
            .unwrap_or("")
    }

    pub fn to_record(&self, attribute: &str) -> DeviceRecord {
        DeviceRecord {
            id: self.general.id.clone(),
            name: self.general.name.clone(),
            site_name: self.general.site.name.clone(),
            ext_attribute_value: self.extension_value(attribute).to_string(),
        }
    }
}

impl DeviceRecord {
    pub fn is_in_sync(&self) -> bool {
        self.site_name == self.ext_attribute_value
    }
}

/// Accept an identifier as either a JSON integer or a string.
///
/// The Classic API uses integer ids while the Pro API uses strings; both are
/// normalized to `String`.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> de::Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or string id")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
