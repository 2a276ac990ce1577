#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood boundary loading, name matching, and choropleth output.
//!
//! Reads administrative boundaries from a `GeoJSON` file, infers which
//! attribute carries the neighborhood name, left-joins the boundaries
//! against the incident aggregates on the normalized name, and renders
//! the result as a `FeatureCollection` ready for a choropleth layer.
//!
//! A missing boundaries file is not an error: [`boundaries::load`] returns
//! `Ok(None)` and the map is simply disabled. Anything else that goes
//! wrong surfaces as a [`NeighborhoodError`] for the caller to report.

pub mod boundaries;
pub mod choropleth;
pub mod join;

pub use join::{infer_name_attribute, join};

use thiserror::Error;

/// Errors that can occur while loading or rendering boundaries.
#[derive(Debug, Error)]
pub enum NeighborhoodError {
    /// Reading the boundaries file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
