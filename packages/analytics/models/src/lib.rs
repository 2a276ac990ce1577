#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter selections and aggregate result types.
//!
//! These are the data contracts between the analytics engine and its
//! consumers (the HTTP API, the CLI, and the map join). They are rebuilt on
//! every filter change and never persisted.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use crime_dash_crime_models::RiskLevel;
use serde::{Deserialize, Serialize};

/// Sentinel period label for a selection with no dated records.
pub const NO_DATE_LABEL: &str = "Dados sem data";

/// Inclusive, optionally open-ended date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day included, or unbounded.
    pub start: Option<NaiveDate>,
    /// Last day included, or unbounded.
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a range from optional bounds.
    #[must_use]
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Whether either bound is set.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Whether a record date falls within the range.
    ///
    /// An inactive range accepts everything, including null dates. An
    /// active range never accepts a null date.
    #[must_use]
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// The user's current filter choices.
///
/// Dimensions combine with AND. An empty set applies no filter on its
/// dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Incident types to keep.
    pub naturezas: BTreeSet<String>,
    /// Neighborhood names (original casing) to keep.
    pub bairros: BTreeSet<String>,
    /// Date bounds.
    pub date_range: DateRange,
}

impl FilterSelection {
    /// Whether this selection keeps every record.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.naturezas.is_empty() && self.bairros.is_empty() && !self.date_range.is_active()
    }
}

/// Values available for each filter dimension in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Sorted distinct incident types.
    pub naturezas: Vec<String>,
    /// Sorted distinct neighborhood names.
    pub bairros: Vec<String>,
    /// Earliest non-null date.
    pub min_date: Option<NaiveDate>,
    /// Latest non-null date.
    pub max_date: Option<NaiveDate>,
}

/// Incident totals for one neighborhood in the active selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodAggregate {
    /// Normalized join key.
    pub bairro_norm: String,
    /// Name as it appears in the incident file.
    pub bairro: String,
    /// Number of incidents.
    pub total_crimes: u64,
    /// Number of distinct incident types.
    pub tipos: u64,
    /// Risk tier relative to the other neighborhoods in the selection.
    pub risco: RiskLevel,
}

/// Incident count for one incident type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Incident type.
    pub natureza: String,
    /// Number of incidents.
    pub total: u64,
}

/// A time-series data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// Period label (`YYYY-MM`).
    pub period: String,
    /// Total incident count in this period.
    pub count: u64,
}

/// Headline numbers for the active selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Number of records.
    pub record_count: u64,
    /// `record_count` with `.` thousands separators.
    pub record_count_label: String,
    /// Number of distinct normalized neighborhoods.
    pub neighborhood_count: u64,
    /// `"YYYY-MM-DD a YYYY-MM-DD"` or [`NO_DATE_LABEL`].
    pub period_label: String,
}

/// How many entries the ranked charts show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewLimits {
    /// Neighborhoods in the top-neighborhoods bar chart.
    pub top_neighborhoods: usize,
    /// Incident types in the by-type bar chart.
    pub top_types: usize,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            top_neighborhoods: 15,
            top_types: 20,
        }
    }
}
