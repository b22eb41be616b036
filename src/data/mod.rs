//! Input data handling

pub mod points;

use serde::Serialize;
use std::collections::BTreeMap;

const COMMUNITY_KEYS: &[&str] = &["comunidade", "community"];
const TECHNOLOGY_KEYS: &[&str] = &["tecnologia", "technology"];

/// A named, located node of the network as declared in the input file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    /// Unique identifier
    pub id: String,

    /// Display name (falls back to the id)
    pub name: String,

    /// Latitude, used for layout and edge lengths
    pub lat: f64,

    /// Longitude, used for layout and edge lengths
    pub lon: f64,

    /// Declared connections, possibly to unknown ids
    pub neighbors: Vec<String>,

    /// Record fields that are not part of the canonical shape
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Point {
    /// Create a point with no coordinates or extra fields
    pub fn new(id: impl Into<String>, neighbors: &[&str]) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            lat: 0.0,
            lon: 0.0,
            neighbors: neighbors.iter().map(|n| n.to_string()).collect(),
            extra: BTreeMap::new(),
        }
    }

    /// Community served by the point (`comunidade` or `community`)
    pub fn community(&self) -> Option<&str> {
        self.extra_text(COMMUNITY_KEYS)
    }

    /// Access technology of the point (`tecnologia` or `technology`)
    pub fn technology(&self) -> Option<&str> {
        self.extra_text(TECHNOLOGY_KEYS)
    }

    fn extra_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.extra.get(*key))
            .find_map(|value| value.as_str())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
