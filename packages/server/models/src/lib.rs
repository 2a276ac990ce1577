#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime dashboard server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the analytics types to allow independent evolution of the API
//! contract.

use chrono::NaiveDate;
use crime_dash_analytics_models::{
    CategoryCount, DashboardSummary, DateRange, FilterSelection, NeighborhoodAggregate,
    TimeSeriesPoint,
};
use crime_dash_crime_models::RiskLevel;
use crime_dash_neighborhood_models::MapSettings;
use serde::{Deserialize, Serialize};

/// Separator for multi-valued filter query parameters. Incident types
/// routinely contain commas, so a pipe is used instead.
pub const LIST_SEPARATOR: char = '|';

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// User-facing message.
    pub error: String,
    /// Suggested remediation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiError {
    /// Creates an error without a hint.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            hint: None,
        }
    }

    /// Attaches a remediation hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Filter query parameters shared by the dashboard, map, and export
/// endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQueryParams {
    /// `|`-separated incident types.
    pub naturezas: Option<String>,
    /// `|`-separated neighborhood names.
    pub bairros: Option<String>,
    /// First day included (`YYYY-MM-DD`).
    pub from: Option<NaiveDate>,
    /// Last day included (`YYYY-MM-DD`).
    pub to: Option<NaiveDate>,
}

impl FilterQueryParams {
    /// Converts the query into a filter selection. Empty list entries are
    /// ignored; other entries are taken verbatim, surrounding spaces
    /// included, since incident values are never trimmed.
    #[must_use]
    pub fn to_selection(&self) -> FilterSelection {
        FilterSelection {
            naturezas: split_list(self.naturezas.as_deref()),
            bairros: split_list(self.bairros.as_deref()),
            date_range: DateRange::new(self.from, self.to),
        }
    }
}

fn split_list(value: Option<&str>) -> std::collections::BTreeSet<String> {
    value
        .map(|s| {
            s.split(LIST_SEPARATOR)
                .filter(|v| !v.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Where the current incident data came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSource {
    /// File name of the upload, or the configured path.
    pub name: String,
    /// Whether the data came from an upload.
    pub uploaded: bool,
    /// Data rows in the file.
    pub rows_read: u64,
    /// Rows removed during cleanup.
    pub rows_dropped: u64,
    /// How the `Data` column was obtained.
    pub date_strategy: String,
}

/// Column-ordered view of the filtered records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTable {
    /// Column names in export order.
    pub columns: Vec<String>,
    /// One text cell per column for each record.
    pub rows: Vec<Vec<String>>,
}

/// Everything the dashboard renders except the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDashboard {
    /// Where the incident data came from.
    pub source: ApiSource,
    /// Headline numbers.
    pub summary: DashboardSummary,
    /// Every neighborhood aggregate, in key order.
    pub neighborhoods: Vec<NeighborhoodAggregate>,
    /// Neighborhoods with the most incidents.
    pub top_neighborhoods: Vec<NeighborhoodAggregate>,
    /// Incident counts per type, largest first.
    pub by_type: Vec<CategoryCount>,
    /// Monthly incident counts.
    pub timeline: Vec<TimeSeriesPoint>,
    /// The filtered records.
    pub table: ApiTable,
}

/// One entry of the risk colour legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Risk tier.
    pub risco: RiskLevel,
    /// Fill colour as `#rrggbb`.
    pub color: String,
}

impl LegendEntry {
    /// The legend for every tier, lowest first.
    #[must_use]
    pub fn all() -> Vec<Self> {
        RiskLevel::all()
            .iter()
            .map(|level| Self {
                risco: *level,
                color: level.color().to_string(),
            })
            .collect()
    }
}

/// Choropleth map state.
///
/// The map degrades independently of the rest of the dashboard: a missing
/// boundaries file disables it, and a load or join failure is reported
/// without failing the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ApiMap {
    /// The map can be drawn.
    #[serde(rename_all = "camelCase")]
    Available {
        /// Joined boundaries with their risk properties.
        geojson: geojson::FeatureCollection,
        /// Base map presentation.
        settings: MapSettings,
        /// Colour for each risk tier.
        legend: Vec<LegendEntry>,
    },
    /// No boundaries file is configured or present.
    Disabled {
        /// Why the map is off.
        message: String,
    },
    /// Loading or joining the boundaries failed.
    Failed {
        /// What went wrong.
        error: String,
        /// How to fix the boundaries file.
        hint: String,
    },
}

/// Response to a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUpload {
    /// The upload as the new incident source.
    pub source: ApiSource,
    /// SHA-256 of the uploaded bytes.
    pub content_key: String,
    /// Rows left after cleanup.
    pub rows_kept: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_pipe_separated_lists() {
        let params = FilterQueryParams {
            naturezas: Some("FURTO|ROUBO, A MAO ARMADA||".to_string()),
            bairros: None,
            from: NaiveDate::from_ymd_opt(2021, 1, 1),
            to: None,
        };
        let selection = params.to_selection();
        assert_eq!(selection.naturezas.len(), 2);
        assert!(selection.naturezas.contains("ROUBO, A MAO ARMADA"));
        assert!(selection.bairros.is_empty());
        assert!(selection.date_range.is_active());
    }

    #[test]
    fn list_entries_keep_surrounding_spaces() {
        let params = FilterQueryParams {
            bairros: Some("Centro |Batel".to_string()),
            ..FilterQueryParams::default()
        };
        let selection = params.to_selection();
        assert!(selection.bairros.contains("Centro "));
        assert!(!selection.bairros.contains("Centro"));
        assert!(selection.bairros.contains("Batel"));
    }

    #[test]
    fn empty_params_are_unfiltered() {
        assert!(FilterQueryParams::default().to_selection().is_unfiltered());
    }

    #[test]
    fn map_state_is_tagged() {
        let json = serde_json::to_value(ApiMap::Disabled {
            message: "off".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "disabled");
        assert_eq!(json["message"], "off");
    }

    #[test]
    fn legend_covers_every_tier() {
        let legend = LegendEntry::all();
        assert_eq!(legend.len(), 5);
        assert_eq!(legend[0].risco, RiskLevel::SemDados);
        assert_eq!(legend[0].color, "#cccccc");
    }

    #[test]
    fn error_without_hint_omits_it() {
        let json = serde_json::to_value(ApiError::new("x")).unwrap();
        assert!(json.get("hint").is_none());

        let json = serde_json::to_value(ApiError::new("x").with_hint("y")).unwrap();
        assert_eq!(json["hint"], "y");
    }
}
