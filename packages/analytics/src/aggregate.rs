//! Grouped counts over the canonical table.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike as _;
use crime_dash_analytics_models::{CategoryCount, NeighborhoodAggregate, TimeSeriesPoint};
use crime_dash_crime_models::CanonicalTable;

use crate::risk::classify;

/// Groups records by `(Bairro_norm, Bairro)` and assigns risk tiers.
///
/// Output is ordered by the group key. `tipos` counts distinct incident
/// types, the empty type included.
#[must_use]
pub fn neighborhoods(table: &CanonicalTable) -> Vec<NeighborhoodAggregate> {
    let mut groups: BTreeMap<(&str, &str), (u64, BTreeSet<&str>)> = BTreeMap::new();

    for record in table.records() {
        let entry = groups
            .entry((record.bairro_norm.as_str(), record.bairro.as_str()))
            .or_default();
        entry.0 += 1;
        entry.1.insert(record.natureza.as_str());
    }

    let totals: Vec<u64> = groups.values().map(|(total, _)| *total).collect();
    let risks = classify(&totals);

    groups
        .into_iter()
        .zip(risks)
        .map(
            |(((bairro_norm, bairro), (total_crimes, tipos)), risco)| NeighborhoodAggregate {
                bairro_norm: bairro_norm.to_owned(),
                bairro: bairro.to_owned(),
                total_crimes,
                tipos: tipos.len() as u64,
                risco,
            },
        )
        .collect()
}

/// The `limit` neighborhoods with the most incidents, highest first.
///
/// Ties keep their key order.
#[must_use]
pub fn top_neighborhoods(
    aggregates: &[NeighborhoodAggregate],
    limit: usize,
) -> Vec<NeighborhoodAggregate> {
    let mut ranked = aggregates.to_vec();
    ranked.sort_by(|a, b| b.total_crimes.cmp(&a.total_crimes));
    ranked.truncate(limit);
    ranked
}

/// Incident counts per type, highest first. Ties keep alphabetical order.
#[must_use]
pub fn by_type(table: &CanonicalTable) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in table.records() {
        *counts.entry(record.natureza.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(natureza, total)| CategoryCount {
            natureza: natureza.to_owned(),
            total,
        })
        .collect();
    ranked.sort_by(|a, b| b.total.cmp(&a.total));
    ranked
}

/// Monthly incident counts in ascending order. Undated records are skipped.
#[must_use]
pub fn monthly_timeline(table: &CanonicalTable) -> Vec<TimeSeriesPoint> {
    let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for date in table.records().iter().filter_map(|r| r.data) {
        *months.entry((date.year(), date.month())).or_default() += 1;
    }

    months
        .into_iter()
        .map(|((year, month), count)| TimeSeriesPoint {
            period: format!("{year:04}-{month:02}"),
            count,
        })
        .collect()
}
