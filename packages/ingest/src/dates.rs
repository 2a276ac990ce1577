//! Incident date resolution.
//!
//! Every row gets exactly one nullable date. A direct `Data` column wins;
//! otherwise the date is assembled from `Ano`/`Mes`/`Dia`. All functions
//! here are total: malformed input yields `None`, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use crime_dash_crime_models::CanonicalColumn;
use serde::{Deserialize, Serialize};

use crate::RawTable;
use crate::schema::ColumnLayout;

/// Three-letter Portuguese month abbreviations.
pub const MONTH_ABBREVIATIONS: &[(&str, u32)] = &[
    ("jan", 1),
    ("fev", 2),
    ("mar", 3),
    ("abr", 4),
    ("mai", 5),
    ("jun", 6),
    ("jul", 7),
    ("ago", 8),
    ("set", 9),
    ("out", 10),
    ("nov", 11),
    ("dez", 12),
];

/// Date-only formats, tried in order. Day-first slashes follow Brazilian
/// convention.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Date-time formats, tried in order; the time part is discarded.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Which source the dates of a table were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateStrategy {
    /// Parsed from a `Data` column.
    DirectColumn,
    /// Assembled from `Ano`, `Mes`, and `Dia` columns.
    YearMonthDay,
    /// No usable date columns; every date is null.
    Unavailable,
}

impl DateStrategy {
    /// Picks the strategy for a column layout.
    #[must_use]
    pub fn for_layout(layout: &ColumnLayout) -> Self {
        if layout.has(CanonicalColumn::Data) {
            Self::DirectColumn
        } else if layout.has(CanonicalColumn::Ano)
            && layout.has(CanonicalColumn::Mes)
            && layout.has(CanonicalColumn::Dia)
        {
            Self::YearMonthDay
        } else {
            Self::Unavailable
        }
    }

    /// The strategy's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DirectColumn => "DIRECT_COLUMN",
            Self::YearMonthDay => "YEAR_MONTH_DAY",
            Self::Unavailable => "UNAVAILABLE",
        }
    }
}

/// Parses a direct date value.
///
/// Accepts ISO dates, ISO date-times (with or without an offset), and
/// day-first slash dates. Surrounding whitespace is ignored.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Reads a month from a raw `Mes` value.
///
/// Only the first three characters of the trimmed, lower-cased value are
/// considered. All-digit tokens are month numbers; anything else is looked
/// up in [`MONTH_ABBREVIATIONS`]. Range is not checked here.
#[must_use]
pub fn month_from_token(value: &str) -> Option<u32> {
    let token: String = value.trim().to_lowercase().chars().take(3).collect();

    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse().ok();
    }

    MONTH_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == token)
        .map(|(_, month)| *month)
}

/// Assembles a date from raw year, month, and day values.
///
/// Any missing part, unparseable number, unknown month, or impossible
/// calendar date yields `None`.
#[must_use]
pub fn resolve_ymd(ano: Option<&str>, mes: Option<&str>, dia: Option<&str>) -> Option<NaiveDate> {
    let year: i32 = ano?.trim().parse().ok()?;
    let month = month_from_token(mes?)?;
    let day: u32 = dia?.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Resolves one date per row of `table`.
///
/// Returns the strategy used and a date column aligned with the rows.
#[must_use]
pub fn resolve(table: &RawTable, layout: &ColumnLayout) -> (DateStrategy, Vec<Option<NaiveDate>>) {
    let strategy = DateStrategy::for_layout(layout);
    let rows = 0..table.len();

    let dates = match strategy {
        DateStrategy::DirectColumn => {
            let data = layout.index_of(CanonicalColumn::Data);
            rows.map(|r| data.and_then(|c| table.cell(r, c)).and_then(parse_date))
                .collect()
        }
        DateStrategy::YearMonthDay => {
            let ano = layout.index_of(CanonicalColumn::Ano);
            let mes = layout.index_of(CanonicalColumn::Mes);
            let dia = layout.index_of(CanonicalColumn::Dia);
            rows.map(|r| {
                resolve_ymd(
                    ano.and_then(|c| table.cell(r, c)),
                    mes.and_then(|c| table.cell(r, c)),
                    dia.and_then(|c| table.cell(r, c)),
                )
            })
            .collect()
        }
        DateStrategy::Unavailable => rows.map(|_| None).collect(),
    };

    (strategy, dates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn table(headers: &[&str], rows: &[&[Option<&str>]]) -> (RawTable, ColumnLayout) {
        let headers: Vec<String> = headers.iter().map(ToString::to_string).collect();
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| c.map(ToString::to_string)).collect())
            .collect();
        let layout = ColumnLayout::from_headers(&headers);
        (RawTable::new(headers, rows), layout)
    }

    #[test]
    fn parses_direct_iso_date() {
        assert_eq!(parse_date("2021-01-01"), ymd(2021, 1, 1));
    }

    #[test]
    fn invalid_direct_date_is_null() {
        assert_eq!(parse_date("invalid"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2021-02-30"), None);
    }

    #[test]
    fn parses_other_direct_formats() {
        assert_eq!(parse_date("15/03/2022"), ymd(2022, 3, 15));
        assert_eq!(parse_date("2022/03/15"), ymd(2022, 3, 15));
        assert_eq!(parse_date("2022-03-15 23:10:00"), ymd(2022, 3, 15));
        assert_eq!(parse_date("2022-03-15T23:10:00.250"), ymd(2022, 3, 15));
        assert_eq!(parse_date("2022-03-15T23:10:00-03:00"), ymd(2022, 3, 15));
        assert_eq!(parse_date("  2022-03-15 "), ymd(2022, 3, 15));
    }

    #[test]
    fn month_tokens() {
        assert_eq!(month_from_token("jan"), Some(1));
        assert_eq!(month_from_token("Fevereiro"), Some(2));
        assert_eq!(month_from_token(" MAR "), Some(3));
        assert_eq!(month_from_token("dez"), Some(12));
        assert_eq!(month_from_token("7"), Some(7));
        assert_eq!(month_from_token("07"), Some(7));
        assert_eq!(month_from_token("xyz"), None);
        assert_eq!(month_from_token(""), None);
        assert_eq!(month_from_token("1.0"), None);
    }

    #[test]
    fn resolves_year_month_day() {
        assert_eq!(
            resolve_ymd(Some("2021"), Some("jan"), Some("1")),
            ymd(2021, 1, 1)
        );
        assert_eq!(
            resolve_ymd(Some("2021"), Some("fev"), Some("2")),
            ymd(2021, 2, 2)
        );
        assert_eq!(
            resolve_ymd(Some(" 2021 "), Some("10"), Some("09")),
            ymd(2021, 10, 9)
        );
    }

    #[test]
    fn malformed_parts_yield_null() {
        assert_eq!(resolve_ymd(None, Some("jan"), Some("1")), None);
        assert_eq!(resolve_ymd(Some("2021"), None, Some("1")), None);
        assert_eq!(resolve_ymd(Some("2021"), Some("jan"), None), None);
        assert_eq!(resolve_ymd(Some("2021"), Some("foo"), Some("1")), None);
        assert_eq!(resolve_ymd(Some("2021"), Some("13"), Some("1")), None);
        assert_eq!(resolve_ymd(Some("2021"), Some("fev"), Some("30")), None);
        assert_eq!(resolve_ymd(Some("abc"), Some("jan"), Some("1")), None);
        assert_eq!(resolve_ymd(Some("2021"), Some("jan"), Some("1.5")), None);
    }

    #[test]
    fn direct_column_takes_precedence() {
        let (raw, layout) = table(
            &["Data", "Ano", "Mes", "Dia"],
            &[
                &[Some("2021-01-01"), Some("1999"), Some("dez"), Some("31")],
                &[Some("invalid"), Some("1999"), Some("dez"), Some("31")],
            ],
        );
        let (strategy, dates) = resolve(&raw, &layout);
        assert_eq!(strategy, DateStrategy::DirectColumn);
        assert_eq!(dates, vec![ymd(2021, 1, 1), None]);
    }

    #[test]
    fn one_bad_row_does_not_affect_others() {
        let (raw, layout) = table(
            &["Ano", "M\u{ea}s", "Dia"],
            &[
                &[Some("2021"), Some("jan"), Some("1")],
                &[Some("2021"), Some("???"), Some("1")],
                &[Some("2021"), None, Some("1")],
                &[Some("2021"), Some("fev"), Some("2")],
            ],
        );
        let (strategy, dates) = resolve(&raw, &layout);
        assert_eq!(strategy, DateStrategy::YearMonthDay);
        assert_eq!(dates, vec![ymd(2021, 1, 1), None, None, ymd(2021, 2, 2)]);
    }

    #[test]
    fn no_date_columns_yields_all_null() {
        let (raw, layout) = table(&["Ano", "Bairro"], &[&[Some("2021"), Some("Centro")]]);
        let (strategy, dates) = resolve(&raw, &layout);
        assert_eq!(strategy, DateStrategy::Unavailable);
        assert_eq!(dates, vec![None]);
    }
}
