//! Overpass JSON response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-level Overpass response (`[out:json]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OsmElement>,
}

/// A node, way or relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsmElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub members: Vec<OsmMember>,
}

impl OsmElement {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn is_node(&self) -> bool {
        self.element_type == "node"
    }

    pub fn is_relation(&self) -> bool {
        self.element_type == "relation"
    }
}

/// Member of a relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsmMember {
    #[serde(rename = "type")]
    pub member_type: String,
    #[serde(rename = "ref")]
    pub member_ref: i64,
    #[serde(default)]
    pub role: String,
}
