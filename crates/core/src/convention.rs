use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::account::ParseKindError;

/// Which mark separates the fractional part; the other one is a thousands
/// separator and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalConvention {
    /// `1.234,56`
    #[default]
    #[serde(alias = "virgula")]
    Comma,
    /// `1,234.56`
    #[serde(alias = "ponto")]
    Dot,
}

impl DecimalConvention {
    /// Rewrites `raw` into plain dotted-decimal text. No validation happens
    /// here; the caller parses the result.
    pub fn normalize(self, raw: &str) -> String {
        match self {
            DecimalConvention::Comma => raw.replace('.', "").replace(',', "."),
            DecimalConvention::Dot => raw.replace(',', ""),
        }
    }
}

impl fmt::Display for DecimalConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalConvention::Comma => write!(f, "comma"),
            DecimalConvention::Dot => write!(f, "dot"),
        }
    }
}

impl FromStr for DecimalConvention {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comma" | "virgula" | "vírgula" | "," => Ok(DecimalConvention::Comma),
            "dot" | "ponto" | "." => Ok(DecimalConvention::Dot),
            other => Err(ParseKindError::Unknown {
                what: "decimal convention",
                value: other.to_string(),
            }),
        }
    }
}
