use serde::{Deserialize, Serialize};

use super::device::deserialize_id;

/// A category from the Pro API (`/api/v1/categories`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub priority: i64,
}
