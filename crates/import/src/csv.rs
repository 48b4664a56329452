use chrono::NaiveDate;
use extrato_core::{AccountKind, CanonicalField, DecimalConvention, Money, TransactionRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

const DATE_FORMAT: &str = "%d/%m/%Y";
const CURRENCY_MARKER: &str = "R$";

/// Per-conversion settings supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionProfile {
    pub account_kind: AccountKind,
    /// Must hold exactly one ASCII character.
    pub delimiter: String,
    pub decimal: DecimalConvention,
    /// Case-insensitive substrings; rows whose description contains any of
    /// them are dropped.
    pub exclude: Vec<String>,
}

impl Default for ConversionProfile {
    fn default() -> Self {
        Self {
            account_kind: AccountKind::Checking,
            delimiter: ";".to_string(),
            decimal: DecimalConvention::Comma,
            exclude: Vec::new(),
        }
    }
}

impl ConversionProfile {
    pub fn delimiter_byte(&self) -> Result<u8, CsvError> {
        let mut chars = self.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Ok(c as u8),
            _ => Err(CsvError::InvalidDelimiter(self.delimiter.clone())),
        }
    }

    fn exclusion_keywords(&self) -> Vec<String> {
        self.exclude
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Fatal conditions: nothing is converted when one of these occurs.
#[derive(Error, Debug)]
pub enum CsvError {
    #[error("CSV error: {0}")]
    CsvError(#[from] ::csv::Error),
    #[error("Missing required column(s): {}", join_fields(.0))]
    MissingColumns(Vec<CanonicalField>),
    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(String),
    #[error("Header line is empty")]
    EmptyHeader,
}

fn join_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a single row was left out of the statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("description matches excluded keyword '{0}'")]
    Excluded(String),
    #[error("malformed row: {0}")]
    Malformed(String),
    #[error("missing {0} value")]
    MissingValue(CanonicalField),
    #[error("invalid date '{0}', expected DD/MM/YYYY")]
    InvalidDate(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Index among the non-blank data lines.
    pub position: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedStatement {
    /// Sorted by date; rows sharing a date keep their file order.
    pub records: Vec<TransactionRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Header positions of the three required columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub amount: usize,
}

impl ColumnMap {
    /// For each field the first synonym present in `columns` wins. Duplicate
    /// header names resolve to their first occurrence.
    pub fn resolve(columns: &[String]) -> Result<Self, CsvError> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (pos, name) in columns.iter().enumerate() {
            index.entry(name.trim().to_lowercase()).or_insert(pos);
        }

        let find = |field: CanonicalField| {
            field
                .synonyms()
                .iter()
                .find_map(|name| index.get(*name).copied())
        };

        let date = find(CanonicalField::Date);
        let description = find(CanonicalField::Description);
        let amount = find(CanonicalField::Amount);

        match (date, description, amount) {
            (Some(date), Some(description), Some(amount)) => Ok(ColumnMap {
                date,
                description,
                amount,
            }),
            _ => {
                let missing = [
                    (CanonicalField::Date, date),
                    (CanonicalField::Description, description),
                    (CanonicalField::Amount, amount),
                ]
                .into_iter()
                .filter(|(_, col)| col.is_none())
                .map(|(field, _)| field)
                .collect();
                Err(CsvError::MissingColumns(missing))
            }
        }
    }
}

/// Parses an export into sorted transaction records.
///
/// Only header problems are errors. Rows that cannot be read are logged and
/// listed in [`ParsedStatement::skipped`]; the rest of the file still converts.
pub fn parse<S: AsRef<str>>(
    header: &str,
    lines: &[S],
    profile: &ConversionProfile,
) -> Result<ParsedStatement, CsvError> {
    let delimiter = profile.delimiter_byte()?;

    let columns: Vec<String> = split_line(header, delimiter)?
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(CsvError::EmptyHeader);
    }

    let map = ColumnMap::resolve(&columns)?;
    debug!(
        date = %columns[map.date],
        description = %columns[map.description],
        amount = %columns[map.amount],
        "resolved header columns"
    );

    let keywords = profile.exclusion_keywords();
    let mut parsed = ParsedStatement::default();

    let rows = lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| !line.trim().is_empty());

    for (position, line) in rows.enumerate() {
        match parse_row(line, position, &map, delimiter, &keywords, profile) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => {
                if let SkipReason::Excluded(_) = reason {
                    debug!(position, %reason, "row excluded");
                } else {
                    warn!(position, line, %reason, "skipping row");
                }
                parsed.skipped.push(SkippedRow { position, reason });
            }
        }
    }

    parsed.records.sort_by_key(|r| r.date);

    info!(
        records = parsed.records.len(),
        skipped = parsed.skipped.len(),
        account_kind = %profile.account_kind,
        "parsed export"
    );

    Ok(parsed)
}

fn split_line(line: &str, delimiter: u8) -> Result<::csv::StringRecord, ::csv::Error> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(line.as_bytes());
    let mut record = ::csv::StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record)
}

fn parse_row(
    line: &str,
    position: usize,
    map: &ColumnMap,
    delimiter: u8,
    keywords: &[String],
    profile: &ConversionProfile,
) -> Result<TransactionRecord, SkipReason> {
    let record =
        split_line(line, delimiter).map_err(|e| SkipReason::Malformed(e.to_string()))?;

    let description = column(&record, CanonicalField::Description, map.description)?
        .trim()
        .to_string();
    let lowered = description.to_lowercase();
    if let Some(keyword) = keywords.iter().find(|k| lowered.contains(k.as_str())) {
        return Err(SkipReason::Excluded(keyword.clone()));
    }

    let date = parse_date(column(&record, CanonicalField::Date, map.date)?)?;
    let amount = parse_amount(
        column(&record, CanonicalField::Amount, map.amount)?,
        profile.decimal,
    )?;
    let amount = profile.account_kind.signed(amount);

    Ok(TransactionRecord::new(date, description, amount, position))
}

fn column<'r>(
    record: &'r ::csv::StringRecord,
    field: CanonicalField,
    col: usize,
) -> Result<&'r str, SkipReason> {
    record.get(col).ok_or(SkipReason::MissingValue(field))
}

fn parse_date(s: &str) -> Result<NaiveDate, SkipReason> {
    let s = s.trim();
    let four_digit_year = s
        .rsplit('/')
        .next()
        .is_some_and(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()));
    if !four_digit_year {
        return Err(SkipReason::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| SkipReason::InvalidDate(s.to_string()))
}

fn parse_amount(s: &str, convention: DecimalConvention) -> Result<Money, SkipReason> {
    let stripped = s.replace(CURRENCY_MARKER, "");
    let normalized = convention.normalize(stripped.trim());
    Decimal::from_str(&normalized)
        .map(Money::from_decimal)
        .map_err(|_| SkipReason::InvalidAmount(s.trim().to_string()))
}
