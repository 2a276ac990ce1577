#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering, risk classification, and aggregation over the canonical
//! incident table.
//!
//! Everything here is a pure function of its inputs and is recomputed on
//! every filter change. Risk tiers are relative to the currently filtered
//! population, not a global scale.

pub mod aggregate;
pub mod filters;
pub mod risk;
pub mod summary;
pub mod view;

pub use risk::{RiskThresholds, classify};
pub use view::DashboardView;
