//! Headline scalars for the active selection.

use std::collections::BTreeSet;

use crime_dash_analytics_models::{DashboardSummary, NO_DATE_LABEL};
use crime_dash_crime_models::{CanonicalTable, DATE_FORMAT};

/// Computes the record count, distinct neighborhood count, and period
/// label of a table.
#[must_use]
pub fn summarize(table: &CanonicalTable) -> DashboardSummary {
    let record_count = table.len() as u64;
    let neighborhood_count = table
        .records()
        .iter()
        .map(|r| r.bairro_norm.as_str())
        .collect::<BTreeSet<_>>()
        .len() as u64;

    DashboardSummary {
        record_count,
        record_count_label: format_count(record_count),
        neighborhood_count,
        period_label: period_label(table),
    }
}

/// Formats a count with `.` as the thousands separator (`1234567` becomes
/// `1.234.567`).
#[must_use]
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }

    out
}

/// `"<min> a <max>"` over the non-null dates, or [`NO_DATE_LABEL`].
#[must_use]
pub fn period_label(table: &CanonicalTable) -> String {
    let dates = table.records().iter().filter_map(|r| r.data);
    match (dates.clone().min(), dates.max()) {
        (Some(min), Some(max)) => format!(
            "{} a {}",
            min.format(DATE_FORMAT),
            max.format(DATE_FORMAT)
        ),
        _ => NO_DATE_LABEL.to_string(),
    }
}
