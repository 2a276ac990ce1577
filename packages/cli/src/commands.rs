//! Non-interactive command implementations.

use std::path::Path;

use crime_dash_analytics::{DashboardView, filters};
use crime_dash_analytics_models::FilterSelection;
use crime_dash_crime_models::CanonicalTable;
use crime_dash_server::config::DashboardConfig;
use crime_dash_server::{AppState, CurrentIncidents, ServerError};
use serde::Serialize;

/// Resolves the configured incident table.
///
/// # Errors
///
/// Returns [`ServerError`] if there is no incident file, it cannot be read,
/// or cleanup drops every row.
pub fn load(config: &DashboardConfig) -> Result<CurrentIncidents, ServerError> {
    AppState::new(config.clone()).current_incidents()
}

/// Renders the headline numbers and ranked charts as text.
#[must_use]
pub fn render_summary(view: &DashboardView) -> String {
    let summary = &view.summary;
    let mut lines = vec![
        format!("Registros: {}", summary.record_count_label),
        format!("Bairros:   {}", summary.neighborhood_count),
        format!("Periodo:   {}", summary.period_label),
    ];

    if !view.top_neighborhoods.is_empty() {
        lines.push(String::new());
        lines.push("Top bairros:".to_string());
        lines.extend(view.top_neighborhoods.iter().map(|agg| {
            format!(
                "  {:<32} {:>8}  {}",
                agg.bairro, agg.total_crimes, agg.risco
            )
        }));
    }

    if !view.by_type.is_empty() {
        lines.push(String::new());
        lines.push("Por natureza:".to_string());
        lines.extend(
            view.by_type
                .iter()
                .map(|count| format!("  {:<40} {:>8}", count.natureza, count.total)),
        );
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryOutput<'a> {
    summary: &'a crime_dash_analytics_models::DashboardSummary,
    top_neighborhoods: &'a [crime_dash_analytics_models::NeighborhoodAggregate],
    by_type: &'a [crime_dash_analytics_models::CategoryCount],
    timeline: &'a [crime_dash_analytics_models::TimeSeriesPoint],
}

/// Renders the summary as pretty JSON.
///
/// # Errors
///
/// Returns the serialization error, if any.
pub fn summary_json(view: &DashboardView) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&SummaryOutput {
        summary: &view.summary,
        top_neighborhoods: &view.top_neighborhoods,
        by_type: &view.by_type,
        timeline: &view.timeline,
    })
}

/// Writes the filtered table to `path`. Returns the number of records
/// written.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn export(
    table: &CanonicalTable,
    selection: &FilterSelection,
    path: &Path,
) -> Result<usize, Box<dyn std::error::Error>> {
    let filtered = filters::apply(table, selection);
    let bytes = crime_dash_ingest::export_bytes(&filtered)?;
    std::fs::write(path, bytes)?;
    log::info!("Wrote {} record(s) to {}", filtered.len(), path.display());
    Ok(filtered.len())
}

/// Builds the choropleth `GeoJSON` for a view, or `None` when the
/// boundaries file is absent.
///
/// # Errors
///
/// Returns an error if the boundaries cannot be loaded or rendered.
pub fn map_geojson(
    config: &DashboardConfig,
    view: &DashboardView,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let Some(boundaries) =
        crime_dash_neighborhood::boundaries::load(&config.data.boundaries_geojson)?
    else {
        return Ok(None);
    };

    let enriched = crime_dash_neighborhood::join(&boundaries, &view.neighborhoods);
    let collection = crime_dash_neighborhood::choropleth::feature_collection(&enriched)?;
    Ok(Some(serde_json::to_string_pretty(&collection)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crime_dash_analytics_models::ViewLimits;

    fn view() -> DashboardView {
        let csv = "Bairro;Natureza;Data\nCentro;FURTO;2021-01-01\nCentro;ROUBO;2021-01-02\nBatel;FURTO;\n";
        let ingested = crime_dash_ingest::ingest_bytes(csv.as_bytes()).unwrap();
        DashboardView::build(
            &ingested.table,
            &FilterSelection::default(),
            ViewLimits::default(),
        )
    }

    #[test]
    fn summary_text_lists_headlines_and_rankings() {
        let text = render_summary(&view());
        assert!(text.contains("Registros: 3"));
        assert!(text.contains("Bairros:   2"));
        assert!(text.contains("Periodo:   2021-01-01 a 2021-01-02"));
        assert!(text.contains("Top bairros:"));
        assert!(text.contains("Centro"));
    }

    #[test]
    fn summary_json_uses_api_names() {
        let json: serde_json::Value = serde_json::from_str(&summary_json(&view()).unwrap()).unwrap();
        assert_eq!(json["summary"]["recordCount"], 3);
        assert_eq!(json["topNeighborhoods"][0]["bairro"], "Centro");
    }

    #[test]
    fn export_writes_filtered_rows() {
        let csv = "Bairro;Natureza\nCentro;FURTO\nBatel;ROUBO\n";
        let ingested = crime_dash_ingest::ingest_bytes(csv.as_bytes()).unwrap();
        let selection = FilterSelection {
            naturezas: ["ROUBO".to_string()].into(),
            ..FilterSelection::default()
        };
        let path = std::env::temp_dir().join(format!("crime_dash_cli_{}.csv", std::process::id()));

        let written = export(&ingested.table, &selection, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(written, 1);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Batel"));
    }

    #[test]
    fn missing_boundaries_yield_no_map() {
        let mut config = DashboardConfig::default();
        config.data.boundaries_geojson = std::env::temp_dir().join("crime_dash_cli_none.geojson");
        assert!(map_geojson(&config, &view()).unwrap().is_none());
    }
}
