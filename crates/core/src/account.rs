use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::money::Money;

/// The two statement shapes the converter can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    #[default]
    #[serde(alias = "corrente")]
    Checking,
    #[serde(alias = "credito")]
    CreditCard,
}

impl AccountKind {
    /// Card exports list charges as positive numbers; the statement books them
    /// as debits, so credit-card amounts are negated.
    pub fn signed(self, amount: Money) -> Money {
        match self {
            AccountKind::Checking => amount,
            AccountKind::CreditCard => -amount,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Checking => write!(f, "checking"),
            AccountKind::CreditCard => write!(f, "credit_card"),
        }
    }
}

impl FromStr for AccountKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "checking" | "corrente" => Ok(AccountKind::Checking),
            "credit_card" | "creditcard" | "credito" | "crédito" => Ok(AccountKind::CreditCard),
            other => Err(ParseKindError::Unknown {
                what: "account kind",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseKindError {
    #[error("Unknown {what}: '{value}'")]
    Unknown { what: &'static str, value: String },
}
