use serde::{Deserialize, Serialize};
use std::fmt;

/// A column the converter needs from every export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Date,
    Description,
    Amount,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 3] = [
        CanonicalField::Date,
        CanonicalField::Description,
        CanonicalField::Amount,
    ];

    /// Accepted header names, lowercase, in match priority order.
    pub fn synonyms(self) -> &'static [&'static str] {
        FIELD_SYNONYMS
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, names)| *names)
            .unwrap_or(&[])
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalField::Date => write!(f, "date"),
            CanonicalField::Description => write!(f, "description"),
            CanonicalField::Amount => write!(f, "amount"),
        }
    }
}

pub const FIELD_SYNONYMS: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::Date, &["data", "date"]),
    (
        CanonicalField::Description,
        &[
            "histórico",
            "historico",
            "descrição",
            "descricao",
            "description",
            "memo",
        ],
    ),
    (
        CanonicalField::Amount,
        &["valor", "montante", "amount", "value"],
    ),
];
