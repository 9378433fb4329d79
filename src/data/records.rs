use std::fmt;

use serde::{Serialize, Serializer};

use crate::clean::{LandUse, PostalCode};

/// Namespace recorded for tag keys without a recognised `namespace:` prefix.
pub const NO_NAMESPACE: &str = "none";

/// Row of the `nodes` table. Every column but `id` may be null when the
/// attribute was missing and nothing could be carried forward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub user: Option<String>,
    pub uid: Option<i64>,
    pub version: Option<i64>,
    pub changeset: Option<i64>,
    pub timestamp: Option<String>,
}

/// Row of the `ways` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WayRecord {
    pub id: i64,
    pub user: Option<String>,
    pub uid: Option<i64>,
    pub version: Option<i64>,
    pub changeset: Option<i64>,
    pub timestamp: Option<String>,
}

/// Row of the `nodes_tags` or `ways_tags` table, depending on the owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRecord {
    pub owner_id: i64,
    #[serde(skip)]
    pub raw_key: String,
    pub namespace: String,
    pub local_name: String,
    pub value: TagValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Text(String),
    PostalCode(PostalCode),
    LandUse(LandUse),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(text) => f.write_str(text),
            TagValue::PostalCode(code) => code.fmt(f),
            TagValue::LandUse(land_use) => land_use.fmt(f),
        }
    }
}

impl Serialize for TagValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
