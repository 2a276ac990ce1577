//! Semicolon-delimited incident file reading and canonical export.
//!
//! Reading is forgiving: malformed UTF-8 byte sequences are dropped, a
//! leading byte-order mark is stripped, header names are trimmed, and
//! short rows are padded with missing cells. No typing happens here;
//! every value is text.

use std::io::Write;

use crime_dash_crime_models::CanonicalTable;

use crate::{IngestError, RawTable};

/// Field delimiter for both input and export files.
pub const DELIMITER: u8 = b';';

/// Default file name offered for the exported table.
pub const EXPORT_FILE_NAME: &str = "crimes_tratado.csv";

/// Cell contents treated as a missing value.
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Decodes bytes as UTF-8, silently dropping malformed sequences.
#[must_use]
pub fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut dropped = 0usize;

    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }

    if dropped > 0 {
        log::debug!("Dropped {dropped} malformed byte(s) while decoding");
    }

    match out.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => out,
    }
}

/// Whether a cell holds a missing-value marker.
#[must_use]
pub fn is_missing(value: &str) -> bool {
    MISSING_MARKERS.contains(&value)
}

/// Reads a raw incident table from bytes.
///
/// # Errors
///
/// Returns [`IngestError::Parse`] if there is no header row, or
/// [`IngestError::Csv`] if the CSV structure cannot be read.
pub fn read_raw(bytes: &[u8]) -> Result<RawTable, IngestError> {
    let text = decode_dropping_invalid(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(IngestError::Parse {
            message: "CSV file contains no header row".to_owned(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Vec<Option<String>> = (0..headers.len())
            .map(|i| {
                record
                    .get(i)
                    .filter(|v| !is_missing(v))
                    .map(ToOwned::to_owned)
            })
            .collect();
        rows.push(row);
    }

    log::info!(
        "Read {} row(s) with {} column(s) from incident file",
        rows.len(),
        headers.len()
    );

    Ok(RawTable::new(headers, rows))
}

/// Writes a canonical table as a semicolon-delimited file.
///
/// Columns follow [`CanonicalTable::columns`]; null dates and missing
/// pass-through values are written as empty cells.
///
/// # Errors
///
/// Returns [`IngestError`] if writing fails.
pub fn write_canonical<W: Write>(table: &CanonicalTable, writer: W) -> Result<(), IngestError> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);

    out.write_record(table.columns())?;
    for record in table.records() {
        out.write_record(table.row(record))?;
    }
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_malformed_bytes() {
        // "Município" encoded as Latin-1: 0xED is not valid UTF-8 here
        let bytes = b"Munic\xedpio;Bairro\nCuritiba;Centro\n";
        let table = read_raw(bytes).unwrap();
        assert_eq!(table.headers(), &["Municpio", "Bairro"]);
        assert_eq!(table.cell(0, 1), Some("Centro"));
    }

    #[test]
    fn strips_bom_and_trims_headers() {
        let bytes = "\u{feff} Bairro ; Natureza\nCentro;FURTO\n".as_bytes();
        let table = read_raw(bytes).unwrap();
        assert_eq!(table.headers(), &["Bairro", "Natureza"]);
    }

    #[test]
    fn values_are_not_trimmed_or_typed() {
        let table = read_raw(b"Ano;Bairro\n2021; Centro \n").unwrap();
        assert_eq!(table.cell(0, 0), Some("2021"));
        assert_eq!(table.cell(0, 1), Some(" Centro "));
    }

    #[test]
    fn missing_markers_and_short_rows_become_none() {
        let table = read_raw(b"Bairro;Natureza;Hora\nNA;;\nCentro\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 0), None);
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(1, 0), Some("Centro"));
        assert_eq!(table.cell(1, 2), None);
    }

    #[test]
    fn quoted_values_may_contain_the_delimiter() {
        let table = read_raw(b"Bairro;Natureza\nCentro;\"FURTO; SIMPLES\"\n").unwrap();
        assert_eq!(table.cell(0, 1), Some("FURTO; SIMPLES"));
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(matches!(read_raw(b""), Err(IngestError::Parse { .. })));
    }

    #[test]
    fn missing_marker_list() {
        assert!(is_missing(""));
        assert!(is_missing("None"));
        assert!(is_missing("NaN"));
        assert!(!is_missing(" "));
        assert!(!is_missing("Centro"));
    }
}
