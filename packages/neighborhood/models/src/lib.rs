#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood boundary and choropleth types.
//!
//! A [`BoundaryRecord`] is one polygon read from the boundaries `GeoJSON`
//! file, with its attributes kept in declaration order. After the join it
//! becomes an [`EnrichedBoundary`] carrying the incident totals of the
//! matching neighborhood.

use crime_dash_crime_models::RiskLevel;
use serde::{Deserialize, Serialize};

/// One administrative boundary and its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRecord {
    /// Feature properties, in declaration order.
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// Boundary geometry, if the feature had one.
    pub geometry: Option<geojson::Geometry>,
}

impl BoundaryRecord {
    /// Attribute names in declaration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}

/// A boundary joined against the neighborhood aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBoundary {
    /// The boundary as read from the file.
    pub boundary: BoundaryRecord,
    /// Normalized value of the name-bearing attribute.
    pub bairro_norm: String,
    /// Incident count, `0` when no aggregate matched.
    pub total_crimes: u64,
    /// Risk tier, [`RiskLevel::SemDados`] when no aggregate matched.
    pub risco: RiskLevel,
}

/// Base map presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Initial map center latitude.
    pub center_lat: f64,
    /// Initial map center longitude.
    pub center_lon: f64,
    /// Initial zoom level.
    pub zoom: f64,
    /// Polygon fill opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Base map style name.
    pub style: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            center_lat: -25.4284,
            center_lon: -49.2733,
            zoom: 10.0,
            opacity: 0.7,
            style: "carto-positron".to_string(),
        }
    }
}

/// Axis-aligned extent of a set of boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Westernmost longitude.
    pub min_lon: f64,
    /// Southernmost latitude.
    pub min_lat: f64,
    /// Easternmost longitude.
    pub max_lon: f64,
    /// Northernmost latitude.
    pub max_lat: f64,
}

impl BoundingBox {
    /// `[min_lon, min_lat, max_lon, max_lat]`, the `GeoJSON` `bbox` order.
    #[must_use]
    pub fn to_vec(self) -> Vec<f64> {
        vec![self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}
