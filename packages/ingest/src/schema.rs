//! Column-name reconciliation.
//!
//! Incident files arrive with headers in several spellings, including
//! mojibake left behind by encoding mismatches (`Munic¡pio`, `Mˆs`) and the
//! shortened forms produced when invalid bytes are dropped during decoding
//! (`Municpio`, `Ms`). Known spellings are mapped by exact match; anything
//! else passes through unchanged.

use std::collections::BTreeMap;
use std::str::FromStr as _;

use crime_dash_crime_models::CanonicalColumn;

/// Known raw header spellings and the canonical column each maps to.
const COLUMN_VARIANTS: &[(&str, CanonicalColumn)] = &[
    ("Ano", CanonicalColumn::Ano),
    ("ANO", CanonicalColumn::Ano),
    ("AISP", CanonicalColumn::Aisp),
    ("Municipio", CanonicalColumn::Municipio),
    ("Munic\u{ed}pio", CanonicalColumn::Municipio),
    ("Munic\u{a1}pio", CanonicalColumn::Municipio),
    ("Municpio", CanonicalColumn::Municipio),
    ("MUNICIPIO", CanonicalColumn::Municipio),
    ("MUNIC\u{cd}PIO", CanonicalColumn::Municipio),
    ("Bairro", CanonicalColumn::Bairro),
    ("BAIRRO", CanonicalColumn::Bairro),
    ("Natureza", CanonicalColumn::Natureza),
    ("NATUREZA", CanonicalColumn::Natureza),
    ("M\u{ea}s", CanonicalColumn::Mes),
    ("Mes", CanonicalColumn::Mes),
    ("M\u{2c6}s", CanonicalColumn::Mes),
    ("Ms", CanonicalColumn::Mes),
    ("MES", CanonicalColumn::Mes),
    ("M\u{ca}S", CanonicalColumn::Mes),
    ("Dia", CanonicalColumn::Dia),
    ("DIA", CanonicalColumn::Dia),
    ("Dia da Semana", CanonicalColumn::DiaSemana),
    ("Dia da semana", CanonicalColumn::DiaSemana),
    ("DiaSemana", CanonicalColumn::DiaSemana),
    ("Hora", CanonicalColumn::Hora),
    ("HORA", CanonicalColumn::Hora),
    ("Data", CanonicalColumn::Data),
    ("DATA", CanonicalColumn::Data),
];

/// Looks up the canonical column for a raw header spelling.
///
/// Exact match only; `"bairro "` or `"Bairros"` are not recognized.
#[must_use]
pub fn canonical_name(raw: &str) -> Option<CanonicalColumn> {
    COLUMN_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == raw)
        .map(|(_, column)| *column)
}

/// Renames raw headers to their canonical names.
///
/// Unrecognized names are returned unchanged, in place.
#[must_use]
pub fn reconcile(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|c| canonical_name(c).map_or_else(|| c.clone(), |col| col.to_string()))
        .collect()
}

/// Where each canonical and pass-through column lives in a raw table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    canonical: BTreeMap<CanonicalColumn, usize>,
    passthrough: Vec<(usize, String)>,
}

impl ColumnLayout {
    /// Builds the layout for a raw header row.
    ///
    /// The first column reconciled to a canonical name claims it. A later
    /// column reconciling to the same name is kept as pass-through under
    /// its raw name. Canonical columns that are not record fields (`Ano`,
    /// `AISP`, `Mes`, `Dia`) are both indexed and passed through. An
    /// incoming `Bairro_norm` column is discarded since it is always
    /// recomputed.
    #[must_use]
    pub fn from_headers(headers: &[String]) -> Self {
        let renamed = reconcile(headers);
        let mut layout = Self::default();

        for (index, (raw, name)) in headers.iter().zip(renamed).enumerate() {
            let Ok(column) = CanonicalColumn::from_str(&name) else {
                log::debug!("Passing through unrecognized column {raw:?}");
                layout.passthrough.push((index, name));
                continue;
            };

            if column == CanonicalColumn::BairroNorm {
                log::debug!("Discarding incoming {name} column, it is recomputed");
                continue;
            }

            if layout.canonical.contains_key(&column) {
                log::warn!(
                    "Column {raw:?} also maps to {column}; keeping it as a pass-through column"
                );
                layout.passthrough.push((index, raw.clone()));
                continue;
            }

            layout.canonical.insert(column, index);
            if !column.is_record_field() {
                layout.passthrough.push((index, name));
            }
        }

        layout
    }

    /// Raw index of a canonical column, if present.
    #[must_use]
    pub fn index_of(&self, column: CanonicalColumn) -> Option<usize> {
        self.canonical.get(&column).copied()
    }

    /// Whether a canonical column is present.
    #[must_use]
    pub fn has(&self, column: CanonicalColumn) -> bool {
        self.canonical.contains_key(&column)
    }

    /// Pass-through columns as `(raw index, output name)` in file order.
    #[must_use]
    pub fn passthrough(&self) -> &[(usize, String)] {
        &self.passthrough
    }

    /// Output names of the pass-through columns.
    #[must_use]
    pub fn passthrough_names(&self) -> Vec<String> {
        self.passthrough.iter().map(|(_, n)| n.clone()).collect()
    }
}
