use axum::extract::multipart::{Multipart, MultipartError};
use extrato_core::ParseKindError;
use extrato_import::{ConversionProfile, CsvError};
use thiserror::Error;

pub const FILE_FIELD: &str = "csv_file";
pub const ACCOUNT_KIND_FIELD: &str = "tipo_conta";
pub const DELIMITER_FIELD: &str = "delimitador";
pub const DECIMAL_FIELD: &str = "formato_decimal";
pub const EXCLUDE_FIELD: &str = "ignorar";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("No file was uploaded")]
    MissingFile,
    #[error("File is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("Upload has no data lines")]
    TooFewLines,
    #[error("Invalid form field '{field}': {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: ParseKindError,
    },
    #[error(transparent)]
    Convert(#[from] CsvError),
}

/// Raw form values as posted by the upload page.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<Vec<u8>>,
    pub account_kind: Option<String>,
    pub delimiter: Option<String>,
    pub decimal: Option<String>,
    pub exclude: Option<String>,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FILE_FIELD => {
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        form.file = Some(bytes.to_vec());
                    }
                }
                ACCOUNT_KIND_FIELD => form.account_kind = Some(field.text().await?),
                DELIMITER_FIELD => form.delimiter = Some(field.text().await?),
                DECIMAL_FIELD => form.decimal = Some(field.text().await?),
                EXCLUDE_FIELD => form.exclude = Some(field.text().await?),
                _ => {}
            }
        }
        Ok(form)
    }

    /// Fields the form leaves out (or leaves blank) fall back to `defaults`.
    pub fn profile(&self, defaults: &ConversionProfile) -> Result<ConversionProfile, UploadError> {
        let mut profile = defaults.clone();

        if let Some(kind) = non_blank(self.account_kind.as_deref()) {
            profile.account_kind = kind.parse().map_err(|source| UploadError::InvalidField {
                field: ACCOUNT_KIND_FIELD,
                source,
            })?;
        }
        if let Some(decimal) = non_blank(self.decimal.as_deref()) {
            profile.decimal = decimal.parse().map_err(|source| UploadError::InvalidField {
                field: DECIMAL_FIELD,
                source,
            })?;
        }
        // Not trimmed: a single space or tab is a legitimate delimiter.
        if let Some(delimiter) = self.delimiter.as_deref().filter(|d| !d.is_empty()) {
            profile.delimiter = delimiter.to_string();
        }
        if let Some(exclude) = &self.exclude {
            profile.exclude = parse_keywords(exclude);
        }

        Ok(profile)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Comma-separated keyword list; blanks are dropped.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decodes an uploaded export into its header and data lines. A leading
/// byte-order mark is dropped.
pub fn split_upload(bytes: &[u8]) -> Result<(&str, Vec<&str>), UploadError> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = split_lines(text).into_iter();
    let header = lines.next().ok_or(UploadError::TooFewLines)?;
    let rows: Vec<&str> = lines.collect();
    if rows.is_empty() {
        return Err(UploadError::TooFewLines);
    }
    Ok((header, rows))
}

/// Splits on `\r\n`, `\n` or a lone `\r`. A trailing terminator does not
/// produce an empty last line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(i) = rest.find(|c: char| c == '\r' || c == '\n') {
        lines.push(&rest[..i]);
        let terminator = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[i + terminator..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }
    lines
}
