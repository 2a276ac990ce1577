#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident file ingestion.
//!
//! Turns a semicolon-delimited incident file with inconsistent encodings
//! and header spellings into a [`CanonicalTable`]:
//!
//! 1. [`csv_file::read_raw`] decodes the bytes and reads every cell as text
//! 2. [`schema::reconcile`] maps header spellings to canonical names
//! 3. [`dates::resolve`] derives one nullable date per row
//! 4. [`pipeline::ingest`] fills text fields, computes `Bairro_norm` with
//!    [`normalize::normalize_text`], and drops rows without a neighborhood
//!
//! Every step is total: malformed values degrade to empty strings or null
//! dates, they never abort the batch.

pub mod csv_file;
pub mod dates;
pub mod normalize;
pub mod pipeline;
pub mod schema;

use crime_dash_crime_models::CanonicalTable;
use thiserror::Error;

pub use pipeline::{IngestReport, Ingested, ingest, ingest_with_report};

/// Errors that can occur while reading or writing incident files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader or writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file structure could not be used at all.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },
}

/// A table read straight from the incident file.
///
/// Header names are trimmed; every cell is raw text, or `None` when the
/// cell is absent or holds a missing-value marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Creates a raw table. Rows shorter than `headers` are treated as
    /// missing their trailing cells.
    #[must_use]
    pub const fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    /// Column names in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the cell at `(row, column)`, `None` when missing.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(Option::as_deref)
    }
}

/// Reads and ingests an incident file from raw bytes.
///
/// # Errors
///
/// Returns [`IngestError`] if the bytes do not contain a usable header row
/// or the CSV structure is unreadable.
pub fn ingest_bytes(bytes: &[u8]) -> Result<Ingested, IngestError> {
    let raw = csv_file::read_raw(bytes)?;
    Ok(ingest_with_report(&raw))
}

/// Reads and ingests an incident file from disk.
///
/// The file is read fully into memory; no handle is held afterwards.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or parsed.
pub fn ingest_file(path: &std::path::Path) -> Result<Ingested, IngestError> {
    log::info!("Reading incident file {}", path.display());
    let bytes = std::fs::read(path)?;
    ingest_bytes(&bytes)
}

/// Serializes a canonical table to semicolon-delimited bytes.
///
/// # Errors
///
/// Returns [`IngestError`] if the CSV writer fails.
pub fn export_bytes(table: &CanonicalTable) -> Result<Vec<u8>, IngestError> {
    let mut out = Vec::new();
    csv_file::write_canonical(table, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_handles_short_rows() {
        let table = RawTable::new(
            vec!["A".to_string(), "B".to_string()],
            vec![vec![Some("x".to_string())]],
        );
        assert_eq!(table.cell(0, 0), Some("x"));
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(1, 0), None);
    }

    #[test]
    fn export_then_reingest_preserves_rows_and_keys() {
        let input = "Ano;M\u{ea}s;Dia;Bairro;Natureza\n\
                     2021;jan;1;S\u{e3}o Braz;FURTO\n\
                     2021;fev;2;  centro ;ROUBO\n\
                     2021;xyz;3;Cajuru;FURTO\n\
                     2021;mar;4;;FURTO\n";
        let first = ingest_bytes(input.as_bytes()).unwrap();
        assert_eq!(first.table.len(), 3);

        let exported = export_bytes(&first.table).unwrap();
        let second = ingest_bytes(&exported).unwrap();

        assert_eq!(second.table.len(), first.table.len());
        let keys = |t: &CanonicalTable| {
            t.records()
                .iter()
                .map(|r| r.bairro_norm.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(keys(&second.table), keys(&first.table));
        assert_eq!(
            second.report.date_strategy,
            dates::DateStrategy::DirectColumn
        );
        let dates = |t: &CanonicalTable| t.records().iter().map(|r| r.data).collect::<Vec<_>>();
        assert_eq!(dates(&second.table), dates(&first.table));
    }
}
