//! Conjunctive filtering of the canonical table.

use std::collections::BTreeSet;

use crime_dash_analytics_models::{FilterOptions, FilterSelection};
use crime_dash_crime_models::{CanonicalRecord, CanonicalTable};

/// Whether a record passes every active filter dimension.
#[must_use]
pub fn matches(record: &CanonicalRecord, selection: &FilterSelection) -> bool {
    (selection.naturezas.is_empty() || selection.naturezas.contains(&record.natureza))
        && (selection.bairros.is_empty() || selection.bairros.contains(&record.bairro))
        && selection.date_range.contains(record.data)
}

/// Returns the records of `table` that match `selection`, in order.
#[must_use]
pub fn apply(table: &CanonicalTable, selection: &FilterSelection) -> CanonicalTable {
    if selection.is_unfiltered() {
        return table.clone();
    }

    let filtered = table.filtered(|r| matches(r, selection));
    log::debug!(
        "Filter kept {} of {} record(s)",
        filtered.len(),
        table.len()
    );
    filtered
}

/// Collects the values available for each filter dimension.
#[must_use]
pub fn options(table: &CanonicalTable) -> FilterOptions {
    let mut naturezas = BTreeSet::new();
    let mut bairros = BTreeSet::new();

    for record in table.records() {
        naturezas.insert(record.natureza.as_str());
        bairros.insert(record.bairro.as_str());
    }

    let dates = table.records().iter().filter_map(|r| r.data);

    FilterOptions {
        naturezas: naturezas.into_iter().map(ToOwned::to_owned).collect(),
        bairros: bairros.into_iter().map(ToOwned::to_owned).collect(),
        min_date: dates.clone().min(),
        max_date: dates.max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crime_dash_analytics_models::DateRange;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(bairro: &str, natureza: &str, data: Option<NaiveDate>) -> CanonicalRecord {
        CanonicalRecord {
            municipio: "CURITIBA".to_string(),
            bairro: bairro.to_string(),
            natureza: natureza.to_string(),
            dia_semana: String::new(),
            hora: String::new(),
            data,
            bairro_norm: bairro.to_uppercase(),
            passthrough: Vec::new(),
        }
    }

    fn table() -> CanonicalTable {
        CanonicalTable::new(
            Vec::new(),
            vec![
                record("Centro", "FURTO", Some(d(2021, 1, 10))),
                record("Centro", "ROUBO", Some(d(2021, 2, 10))),
                record("Cajuru", "FURTO", None),
                record("Batel", "ROUBO", Some(d(2021, 3, 10))),
            ],
        )
    }

    #[test]
    fn empty_selection_keeps_everything() {
        assert_eq!(apply(&table(), &FilterSelection::default()).len(), 4);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let selection = FilterSelection {
            naturezas: ["FURTO".to_string()].into(),
            bairros: ["Centro".to_string(), "Cajuru".to_string()].into(),
            date_range: DateRange::default(),
        };
        let out = apply(&table(), &selection);
        assert_eq!(out.len(), 2);
        assert!(out.records().iter().all(|r| r.natureza == "FURTO"));
    }

    #[test]
    fn date_range_excludes_undated_records() {
        let selection = FilterSelection {
            date_range: DateRange::new(Some(d(2021, 1, 1)), Some(d(2021, 2, 10))),
            ..FilterSelection::default()
        };
        let out = apply(&table(), &selection);
        assert_eq!(out.len(), 2);
        assert!(out.records().iter().all(|r| r.data.is_some()));
    }

    #[test]
    fn open_ended_date_range() {
        let selection = FilterSelection {
            date_range: DateRange::new(Some(d(2021, 2, 1)), None),
            ..FilterSelection::default()
        };
        assert_eq!(apply(&table(), &selection).len(), 2);
    }

    #[test]
    fn options_are_sorted_and_distinct() {
        let opts = options(&table());
        assert_eq!(opts.naturezas, vec!["FURTO", "ROUBO"]);
        assert_eq!(opts.bairros, vec!["Batel", "Cajuru", "Centro"]);
        assert_eq!(opts.min_date, Some(d(2021, 1, 10)));
        assert_eq!(opts.max_date, Some(d(2021, 3, 10)));
    }

    #[test]
    fn options_without_dates() {
        let t = CanonicalTable::new(Vec::new(), vec![record("Centro", "FURTO", None)]);
        let opts = options(&t);
        assert_eq!(opts.min_date, None);
        assert_eq!(opts.max_date, None);
    }
}
