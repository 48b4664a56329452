use tracing::info;

use crate::csv::{ConversionProfile, CsvError, SkippedRow};
use crate::ofx::build;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    pub content: String,
    pub transactions: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ConvertedDocument {
    pub fn into_bytes(self) -> Vec<u8> {
        self.content.into_bytes()
    }
}

/// Outcome of a conversion whose header was valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Document(ConvertedDocument),
    /// Every row was skipped or excluded; no file should be served.
    Empty { skipped: Vec<SkippedRow> },
}

/// Parses an export and renders it as an OFX statement.
pub fn convert<S: AsRef<str>>(
    header: &str,
    lines: &[S],
    profile: &ConversionProfile,
) -> Result<Conversion, CsvError> {
    let parsed = crate::csv::parse(header, lines, profile)?;

    if parsed.records.is_empty() {
        info!(skipped = parsed.skipped.len(), "no transactions to convert");
        return Ok(Conversion::Empty {
            skipped: parsed.skipped,
        });
    }

    let content = build(&parsed.records, profile.account_kind);
    info!(
        transactions = parsed.records.len(),
        bytes = content.len(),
        "rendered OFX statement"
    );

    Ok(Conversion::Document(ConvertedDocument {
        content,
        transactions: parsed.records.len(),
        skipped: parsed.skipped,
    }))
}
