//! Matches boundaries to neighborhood aggregates by normalized name.

use std::collections::BTreeMap;

use crime_dash_analytics_models::NeighborhoodAggregate;
use crime_dash_crime_models::RiskLevel;
use crime_dash_ingest::normalize::normalize_value;
use crime_dash_neighborhood_models::{BoundaryRecord, EnrichedBoundary};

/// Attribute-name fragments that mark the neighborhood name.
const NAME_HINTS: &[&str] = &["bairro", "nome"];

/// Picks the attribute that carries the neighborhood name.
///
/// Attribute names are taken in first-appearance order across all records.
/// The first one containing `bairro` or `nome` (case-insensitive) wins;
/// otherwise the first attribute. `None` when no record has attributes.
#[must_use]
pub fn infer_name_attribute(boundaries: &[BoundaryRecord]) -> Option<String> {
    let mut names: Vec<&str> = Vec::new();
    for name in boundaries.iter().flat_map(BoundaryRecord::attribute_names) {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    names
        .iter()
        .find(|name| {
            let lower = name.to_lowercase();
            NAME_HINTS.iter().any(|hint| lower.contains(hint))
        })
        .or_else(|| names.first())
        .map(|name| (*name).to_string())
}

/// Left-joins boundaries against aggregates on `Bairro_norm`.
///
/// Every boundary is kept. A boundary with no matching aggregate gets
/// `total_crimes = 0` and [`RiskLevel::SemDados`]. A boundary whose name
/// matches several aggregates (the same normalized name spelled
/// differently in the incident file) appears once per match.
#[must_use]
pub fn join(
    boundaries: &[BoundaryRecord],
    aggregates: &[NeighborhoodAggregate],
) -> Vec<EnrichedBoundary> {
    let name_attribute = infer_name_attribute(boundaries);
    log::debug!("Boundary name attribute: {name_attribute:?}");

    let mut by_key: BTreeMap<&str, Vec<&NeighborhoodAggregate>> = BTreeMap::new();
    for aggregate in aggregates {
        by_key
            .entry(aggregate.bairro_norm.as_str())
            .or_default()
            .push(aggregate);
    }

    let mut enriched = Vec::with_capacity(boundaries.len());
    let mut unmatched = 0usize;

    for boundary in boundaries {
        let bairro_norm = name_attribute
            .as_deref()
            .and_then(|attr| boundary.properties.get(attr))
            .map(normalize_value)
            .unwrap_or_default();

        if let Some(matches) = by_key.get(bairro_norm.as_str()) {
            for aggregate in matches {
                enriched.push(EnrichedBoundary {
                    boundary: boundary.clone(),
                    bairro_norm: bairro_norm.clone(),
                    total_crimes: aggregate.total_crimes,
                    risco: aggregate.risco,
                });
            }
        } else {
            unmatched += 1;
            enriched.push(EnrichedBoundary {
                boundary: boundary.clone(),
                bairro_norm,
                total_crimes: 0,
                risco: RiskLevel::SemDados,
            });
        }
    }

    log::debug!(
        "Joined {} boundaries, {unmatched} without incident data",
        boundaries.len()
    );

    enriched
}
