use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::money::Money;

/// One normalized statement line, ready for the OFX builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    /// SHA-256 hex digest used as the OFX `FITID`.
    pub fit_id: String,
}

impl TransactionRecord {
    /// `position` is the row's index in the source file. It is hashed in so
    /// that repeated identical lines still get distinct ids.
    pub fn new(date: NaiveDate, description: String, amount: Money, position: usize) -> Self {
        let fit_id = fingerprint(date, &description, amount, position);
        TransactionRecord {
            date,
            description,
            amount,
            fit_id,
        }
    }
}

/// Hex SHA-256 over `date ‖ description ‖ amount ‖ position`.
pub fn fingerprint(date: NaiveDate, description: &str, amount: Money, position: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_string().as_bytes());
    hasher.update(position.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
