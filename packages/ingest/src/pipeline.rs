//! Raw-to-canonical transformation.

use crime_dash_crime_models::{CanonicalColumn, CanonicalRecord, CanonicalTable};
use serde::{Deserialize, Serialize};

use crate::RawTable;
use crate::dates::{self, DateStrategy};
use crate::normalize::normalize_text;
use crate::schema::ColumnLayout;

/// Shown when cleanup leaves no rows.
pub const EMPTY_TABLE_MESSAGE: &str =
    "Dados vazios apos limpeza. Confira colunas Bairro/Natureza/ano.";

/// What happened during one ingestion pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Rows read from the raw table.
    pub rows_read: usize,
    /// Rows dropped because their neighborhood normalized to empty.
    pub rows_dropped: usize,
    /// How dates were derived.
    pub date_strategy: DateStrategy,
    /// Columns the dashboard relies on that the input did not provide.
    pub missing_columns: Vec<CanonicalColumn>,
}

impl IngestReport {
    /// Rows kept in the canonical table.
    #[must_use]
    pub const fn rows_kept(&self) -> usize {
        self.rows_read - self.rows_dropped
    }

    /// Names the expected columns the input lacked, if any.
    #[must_use]
    pub fn missing_columns_hint(&self) -> Option<String> {
        if self.missing_columns.is_empty() {
            return None;
        }
        let names: Vec<String> = self
            .missing_columns
            .iter()
            .map(ToString::to_string)
            .collect();
        Some(format!("Colunas ausentes: {}.", names.join(", ")))
    }

    /// User-facing explanation for an empty canonical table.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self.missing_columns_hint() {
            Some(hint) => format!("{EMPTY_TABLE_MESSAGE} {hint}"),
            None => EMPTY_TABLE_MESSAGE.to_string(),
        }
    }
}

/// A canonical table together with the report of how it was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    /// The cleaned table. May be empty.
    pub table: CanonicalTable,
    /// Ingestion statistics and diagnostics.
    pub report: IngestReport,
}

/// Transforms a raw table into the canonical table.
///
/// See [`ingest_with_report`].
#[must_use]
pub fn ingest(raw: &RawTable) -> CanonicalTable {
    ingest_with_report(raw).table
}

/// Transforms a raw table into the canonical table and reports on it.
///
/// Headers are reconciled, dates resolved, text fields defaulted to the
/// empty string, and `Bairro_norm` computed from `Bairro`. Rows whose
/// `Bairro_norm` is empty are dropped. An empty result is valid; callers
/// decide whether to proceed.
#[must_use]
pub fn ingest_with_report(raw: &RawTable) -> Ingested {
    let layout = ColumnLayout::from_headers(raw.headers());
    let (date_strategy, dates) = dates::resolve(raw, &layout);

    let text = |row: usize, column: CanonicalColumn| -> String {
        layout
            .index_of(column)
            .and_then(|c| raw.cell(row, c))
            .map(ToOwned::to_owned)
            .unwrap_or_default()
    };

    let mut records = Vec::with_capacity(raw.len());
    for (row, data) in dates.into_iter().enumerate() {
        let bairro = text(row, CanonicalColumn::Bairro);
        let bairro_norm = normalize_text(&bairro);
        if bairro_norm.is_empty() {
            continue;
        }

        records.push(CanonicalRecord {
            municipio: text(row, CanonicalColumn::Municipio),
            natureza: text(row, CanonicalColumn::Natureza),
            dia_semana: text(row, CanonicalColumn::DiaSemana),
            hora: text(row, CanonicalColumn::Hora),
            bairro,
            data,
            bairro_norm,
            passthrough: layout
                .passthrough()
                .iter()
                .map(|(c, _)| raw.cell(row, *c).map(ToOwned::to_owned))
                .collect(),
        });
    }

    let report = IngestReport {
        rows_read: raw.len(),
        rows_dropped: raw.len() - records.len(),
        date_strategy,
        missing_columns: missing_columns(&layout, date_strategy),
    };

    log::info!(
        "Ingested {} of {} row(s) ({} dropped without a neighborhood), dates: {:?}",
        report.rows_kept(),
        report.rows_read,
        report.rows_dropped,
        report.date_strategy,
    );
    if !report.missing_columns.is_empty() {
        log::warn!("Input is missing columns: {:?}", report.missing_columns);
    }

    Ingested {
        table: CanonicalTable::new(layout.passthrough_names(), records),
        report,
    }
}

fn missing_columns(layout: &ColumnLayout, date_strategy: DateStrategy) -> Vec<CanonicalColumn> {
    let mut missing: Vec<CanonicalColumn> = [CanonicalColumn::Bairro, CanonicalColumn::Natureza]
        .into_iter()
        .filter(|c| !layout.has(*c))
        .collect();

    if date_strategy == DateStrategy::Unavailable {
        missing.push(CanonicalColumn::Data);
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(headers: &[&str], rows: &[&[Option<&str>]]) -> RawTable {
        RawTable::new(
            headers.iter().map(ToString::to_string).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.map(ToString::to_string)).collect())
                .collect(),
        )
    }

    #[test]
    fn drops_rows_without_a_neighborhood() {
        let table = raw(
            &["Bairro", "Natureza"],
            &[
                &[Some("Centro"), Some("FURTO")],
                &[Some(""), Some("FURTO")],
                &[None, Some("ROUBO")],
                &[Some("   "), Some("FURTO")],
                &[Some("\u{2603}"), Some("FURTO")],
                &[Some("Cajuru"), Some("FURTO")],
            ],
        );
        let out = ingest_with_report(&table);
        assert_eq!(out.table.len(), 2);
        assert!(out.table.len() <= table.len());
        assert_eq!(out.report.rows_dropped, 4);
        assert!(out.table.records().iter().all(|r| !r.bairro_norm.is_empty()));
    }

    #[test]
    fn reconciles_headers_and_defaults_text_fields() {
        let table = raw(
            &["Munic\u{a1}pio", "BAIRRO", "Dia da Semana", "Ano", "M\u{2c6}s", "Dia"],
            &[&[
                Some("Curitiba"),
                Some("Jardim Bot\u{e2}nico"),
                None,
                Some("2021"),
                Some("mar"),
                Some("5"),
            ]],
        );
        let out = ingest_with_report(&table);
        let record = &out.table.records()[0];

        assert_eq!(record.municipio, "Curitiba");
        assert_eq!(record.bairro, "Jardim Bot\u{e2}nico");
        assert_eq!(record.bairro_norm, "JARDIM BOTANICO");
        assert_eq!(record.dia_semana, "");
        assert_eq!(record.hora, "");
        assert_eq!(record.natureza, "");
        assert_eq!(record.data, NaiveDate::from_ymd_opt(2021, 3, 5));
        assert_eq!(out.report.date_strategy, DateStrategy::YearMonthDay);
        assert_eq!(out.report.missing_columns, vec![CanonicalColumn::Natureza]);
    }

    #[test]
    fn carries_passthrough_columns() {
        let table = raw(
            &["AISP", "Bairro", "Latitude"],
            &[&[Some("3"), Some("Centro"), None]],
        );
        let out = ingest(&table);
        assert_eq!(out.passthrough_columns(), &["AISP", "Latitude"]);
        assert_eq!(
            out.records()[0].passthrough,
            vec![Some("3".to_string()), None]
        );
    }

    #[test]
    fn missing_bairro_column_yields_empty_table() {
        let table = raw(&["Natureza"], &[&[Some("FURTO")], &[Some("ROUBO")]]);
        let out = ingest_with_report(&table);
        assert!(out.table.is_empty());
        assert_eq!(
            out.report.missing_columns,
            vec![CanonicalColumn::Bairro, CanonicalColumn::Data]
        );
        assert!(out.report.diagnostic().contains("Bairro, Data"));
        assert_eq!(
            out.report.missing_columns_hint().as_deref(),
            Some("Colunas ausentes: Bairro, Data.")
        );
    }

    #[test]
    fn complete_input_has_no_missing_columns_hint() {
        let table = raw(&["Bairro", "Natureza", "Data"], &[]);
        let out = ingest_with_report(&table);
        assert_eq!(out.report.missing_columns_hint(), None);
        assert_eq!(out.report.diagnostic(), EMPTY_TABLE_MESSAGE);
    }

    #[test]
    fn preserves_source_order() {
        let table = raw(
            &["Bairro"],
            &[&[Some("Zeta")], &[Some("Alfa")], &[Some("Meio")]],
        );
        let names: Vec<String> = ingest(&table)
            .records()
            .iter()
            .map(|r| r.bairro.clone())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alfa", "Meio"]);
    }
}
