#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Canonical incident schema and risk tier definitions.
//!
//! This crate defines the canonical column set that every incident file is
//! reconciled into, the ordinal [`RiskLevel`] tiers assigned to
//! neighborhoods, and the [`CanonicalTable`] produced by ingestion and
//! consumed by analytics, export, and the HTTP API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Date format used when a canonical date is rendered as text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical column names that raw headers are reconciled into.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CanonicalColumn {
    /// Year of the incident.
    Ano,
    /// Integrated public safety area code.
    #[serde(rename = "AISP")]
    #[strum(serialize = "AISP")]
    Aisp,
    /// Municipality.
    Municipio,
    /// Neighborhood name, original casing.
    Bairro,
    /// Incident type.
    Natureza,
    /// Month, either numeric or a Portuguese name.
    Mes,
    /// Day of month.
    Dia,
    /// Day of the week (free text).
    DiaSemana,
    /// Time of day (free text).
    Hora,
    /// Full incident date.
    Data,
    /// Normalized neighborhood join key. Always derived, never read.
    #[serde(rename = "Bairro_norm")]
    #[strum(serialize = "Bairro_norm")]
    BairroNorm,
}

impl CanonicalColumn {
    /// Leading columns of every exported canonical table, in order.
    pub const EXPORT_LEADING: &[Self] = &[
        Self::Municipio,
        Self::Bairro,
        Self::Natureza,
        Self::DiaSemana,
        Self::Hora,
        Self::Data,
    ];

    /// Whether this column is stored as a dedicated [`CanonicalRecord`]
    /// field rather than carried as a pass-through column.
    #[must_use]
    pub const fn is_record_field(self) -> bool {
        matches!(
            self,
            Self::Municipio
                | Self::Bairro
                | Self::Natureza
                | Self::DiaSemana
                | Self::Hora
                | Self::Data
                | Self::BairroNorm
        )
    }
}

/// Ordinal risk tier assigned to a neighborhood by relative incident
/// volume within the active selection.
///
/// [`RiskLevel::SemDados`] marks boundaries with no matching incidents and
/// sorts below every real tier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RiskLevel {
    /// No incident data for this area.
    #[serde(rename = "Sem dados")]
    #[strum(serialize = "Sem dados")]
    SemDados,
    /// At or below the 25th percentile.
    Baixo,
    /// Above p25, at or below the median.
    Medio,
    /// Above the median, at or below p75.
    Alto,
    /// Above the 75th percentile.
    Critico,
}

impl RiskLevel {
    /// Returns the choropleth fill colour for this tier.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Baixo => "#6abf69",
            Self::Medio => "#f7d154",
            Self::Alto => "#f28e2c",
            Self::Critico => "#d7263d",
            Self::SemDados => "#cccccc",
        }
    }

    /// Returns all variants of this enum, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::SemDados,
            Self::Baixo,
            Self::Medio,
            Self::Alto,
            Self::Critico,
        ]
    }
}

/// One cleaned incident row.
///
/// Invariant: `bairro_norm` is never empty for a record held in a
/// [`CanonicalTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Municipality.
    #[serde(rename = "Municipio")]
    pub municipio: String,
    /// Neighborhood name, original casing.
    #[serde(rename = "Bairro")]
    pub bairro: String,
    /// Incident type.
    #[serde(rename = "Natureza")]
    pub natureza: String,
    /// Day of the week.
    #[serde(rename = "DiaSemana")]
    pub dia_semana: String,
    /// Time of day.
    #[serde(rename = "Hora")]
    pub hora: String,
    /// Resolved incident date, `None` when it could not be determined.
    #[serde(rename = "Data")]
    pub data: Option<NaiveDate>,
    /// Accent-stripped, uppercased, whitespace-collapsed `bairro`.
    #[serde(rename = "Bairro_norm")]
    pub bairro_norm: String,
    /// Values of the table's pass-through columns, positionally aligned
    /// with [`CanonicalTable::passthrough_columns`].
    #[serde(skip)]
    pub passthrough: Vec<Option<String>>,
}

impl CanonicalRecord {
    /// Returns the value of a record field column as text.
    ///
    /// Returns `None` for columns that are not record fields.
    #[must_use]
    pub fn field(&self, column: CanonicalColumn) -> Option<String> {
        match column {
            CanonicalColumn::Municipio => Some(self.municipio.clone()),
            CanonicalColumn::Bairro => Some(self.bairro.clone()),
            CanonicalColumn::Natureza => Some(self.natureza.clone()),
            CanonicalColumn::DiaSemana => Some(self.dia_semana.clone()),
            CanonicalColumn::Hora => Some(self.hora.clone()),
            CanonicalColumn::Data => Some(
                self.data
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
            ),
            CanonicalColumn::BairroNorm => Some(self.bairro_norm.clone()),
            CanonicalColumn::Ano
            | CanonicalColumn::Aisp
            | CanonicalColumn::Mes
            | CanonicalColumn::Dia => None,
        }
    }
}

/// The cleaned, schema-reconciled incident dataset.
///
/// Row order is the insertion order of the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalTable {
    passthrough_columns: Vec<String>,
    records: Vec<CanonicalRecord>,
}

impl CanonicalTable {
    /// Creates a table from pass-through column names and records.
    #[must_use]
    pub const fn new(passthrough_columns: Vec<String>, records: Vec<CanonicalRecord>) -> Self {
        Self {
            passthrough_columns,
            records,
        }
    }

    /// Names of the raw columns carried through unchanged.
    #[must_use]
    pub fn passthrough_columns(&self) -> &[String] {
        &self.passthrough_columns
    }

    /// All records, in source order.
    #[must_use]
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds zero records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a new table with the same columns holding only the records
    /// that match `predicate`, in their original order.
    #[must_use]
    pub fn filtered<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&CanonicalRecord) -> bool,
    {
        Self {
            passthrough_columns: self.passthrough_columns.clone(),
            records: self
                .records
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
        }
    }

    /// Column names in export order: the leading canonical fields, the
    /// pass-through columns, then `Bairro_norm`.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        CanonicalColumn::EXPORT_LEADING
            .iter()
            .map(ToString::to_string)
            .chain(self.passthrough_columns.iter().cloned())
            .chain(std::iter::once(CanonicalColumn::BairroNorm.to_string()))
            .collect()
    }

    /// Renders a record as text cells aligned with [`Self::columns`].
    ///
    /// Missing pass-through values and null dates become empty cells.
    #[must_use]
    pub fn row(&self, record: &CanonicalRecord) -> Vec<String> {
        let mut cells: Vec<String> = CanonicalColumn::EXPORT_LEADING
            .iter()
            .filter_map(|c| record.field(*c))
            .collect();

        cells.extend(
            (0..self.passthrough_columns.len())
                .map(|i| record.passthrough.get(i).cloned().flatten().unwrap_or_default()),
        );
        cells.push(record.bairro_norm.clone());
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn record(bairro: &str, data: Option<NaiveDate>, extra: Vec<Option<String>>) -> CanonicalRecord {
        CanonicalRecord {
            municipio: "CURITIBA".to_string(),
            bairro: bairro.to_string(),
            natureza: "FURTO".to_string(),
            dia_semana: String::new(),
            hora: "10:00".to_string(),
            data,
            bairro_norm: bairro.to_uppercase(),
            passthrough: extra,
        }
    }

    #[test]
    fn risk_level_labels_round_trip_through_strum() {
        for level in RiskLevel::all() {
            let label = level.to_string();
            assert_eq!(RiskLevel::from_str(&label).unwrap(), *level);
        }
        assert_eq!(RiskLevel::SemDados.to_string(), "Sem dados");
        assert_eq!(RiskLevel::Critico.as_ref(), "Critico");
    }

    #[test]
    fn risk_levels_are_ordered_by_severity() {
        assert!(RiskLevel::Baixo < RiskLevel::Medio);
        assert!(RiskLevel::Medio < RiskLevel::Alto);
        assert!(RiskLevel::Alto < RiskLevel::Critico);
        assert!(RiskLevel::SemDados < RiskLevel::Baixo);
    }

    #[test]
    fn canonical_column_names_match_export_headers() {
        assert_eq!(CanonicalColumn::Aisp.to_string(), "AISP");
        assert_eq!(CanonicalColumn::BairroNorm.to_string(), "Bairro_norm");
        assert_eq!(
            CanonicalColumn::from_str("DiaSemana").unwrap(),
            CanonicalColumn::DiaSemana
        );
    }

    #[test]
    fn columns_and_rows_are_aligned() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4);
        let table = CanonicalTable::new(
            vec!["AISP".to_string(), "Ano".to_string()],
            vec![record("Centro", date, vec![Some("1".to_string()), None])],
        );

        let columns = table.columns();
        let row = table.row(&table.records()[0]);

        assert_eq!(
            columns,
            vec![
                "Municipio",
                "Bairro",
                "Natureza",
                "DiaSemana",
                "Hora",
                "Data",
                "AISP",
                "Ano",
                "Bairro_norm"
            ]
        );
        assert_eq!(columns.len(), row.len());
        assert_eq!(row[5], "2021-03-04");
        assert_eq!(row[6], "1");
        assert_eq!(row[7], "");
        assert_eq!(row[8], "CENTRO");
    }

    #[test]
    fn null_date_renders_as_empty_cell() {
        let table = CanonicalTable::new(Vec::new(), vec![record("Centro", None, Vec::new())]);
        assert_eq!(table.row(&table.records()[0])[5], "");
    }

    #[test]
    fn filtered_preserves_order_and_columns() {
        let table = CanonicalTable::new(
            vec!["AISP".to_string()],
            vec![
                record("A", None, vec![None]),
                record("B", None, vec![None]),
                record("C", None, vec![None]),
            ],
        );
        let filtered = table.filtered(|r| r.bairro != "B");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.records()[0].bairro, "A");
        assert_eq!(filtered.records()[1].bairro, "C");
        assert_eq!(filtered.passthrough_columns(), table.passthrough_columns());
    }
}
