//! Everything a dashboard render needs for one filter selection.

use crime_dash_analytics_models::{
    CategoryCount, DashboardSummary, FilterSelection, NeighborhoodAggregate, TimeSeriesPoint,
    ViewLimits,
};
use crime_dash_crime_models::CanonicalTable;

use crate::{aggregate, filters, summary};

/// Derived view of the canonical table under a filter selection.
///
/// Rebuilt from scratch whenever the selection changes.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Headline numbers for the filtered records.
    pub summary: DashboardSummary,
    /// All neighborhood aggregates in key order. Feeds the map join.
    pub neighborhoods: Vec<NeighborhoodAggregate>,
    /// The busiest neighborhoods, at most `ViewLimits::top_neighborhoods`.
    pub top_neighborhoods: Vec<NeighborhoodAggregate>,
    /// Counts per incident type, at most `ViewLimits::top_types`.
    pub by_type: Vec<CategoryCount>,
    /// Monthly counts, oldest first.
    pub timeline: Vec<TimeSeriesPoint>,
    /// The filtered records.
    pub table: CanonicalTable,
}

impl DashboardView {
    /// Filters `table` and computes every aggregate over the result.
    #[must_use]
    pub fn build(table: &CanonicalTable, selection: &FilterSelection, limits: ViewLimits) -> Self {
        let filtered = filters::apply(table, selection);
        let neighborhoods = aggregate::neighborhoods(&filtered);
        let top_neighborhoods =
            aggregate::top_neighborhoods(&neighborhoods, limits.top_neighborhoods);

        let mut by_type = aggregate::by_type(&filtered);
        by_type.truncate(limits.top_types);

        Self {
            summary: summary::summarize(&filtered),
            neighborhoods,
            top_neighborhoods,
            by_type,
            timeline: aggregate::monthly_timeline(&filtered),
            table: filtered,
        }
    }

    /// Whether the selection matched no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crime_dash_crime_models::CanonicalRecord;

    fn record(bairro: &str, natureza: &str) -> CanonicalRecord {
        CanonicalRecord {
            municipio: "CURITIBA".to_string(),
            bairro: bairro.to_string(),
            natureza: natureza.to_string(),
            dia_semana: String::new(),
            hora: String::new(),
            data: NaiveDate::from_ymd_opt(2021, 3, 4),
            bairro_norm: bairro.to_uppercase(),
            passthrough: Vec::new(),
        }
    }

    fn table() -> CanonicalTable {
        let mut records = Vec::new();
        for i in 0..30 {
            records.push(record(&format!("B{i:02}"), &format!("T{:02}", i % 25)));
        }
        CanonicalTable::new(Vec::new(), records)
    }

    #[test]
    fn applies_limits() {
        let view = DashboardView::build(&table(), &FilterSelection::default(), ViewLimits::default());
        assert_eq!(view.neighborhoods.len(), 30);
        assert_eq!(view.top_neighborhoods.len(), 15);
        assert_eq!(view.by_type.len(), 20);
        assert_eq!(view.summary.record_count, 30);
        assert_eq!(view.timeline.len(), 1);
    }

    #[test]
    fn reflects_the_selection() {
        let selection = FilterSelection {
            bairros: ["B01".to_string()].into(),
            ..FilterSelection::default()
        };
        let view = DashboardView::build(&table(), &selection, ViewLimits::default());
        assert_eq!(view.table.len(), 1);
        assert_eq!(view.neighborhoods.len(), 1);
        assert_eq!(view.summary.neighborhood_count, 1);
    }

    #[test]
    fn empty_selection_result() {
        let selection = FilterSelection {
            naturezas: ["NONE".to_string()].into(),
            ..FilterSelection::default()
        };
        let view = DashboardView::build(&table(), &selection, ViewLimits::default());
        assert!(view.is_empty());
        assert!(view.neighborhoods.is_empty());
        assert!(view.timeline.is_empty());
    }
}
