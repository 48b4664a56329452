pub mod account;
pub mod convention;
pub mod field;
pub mod money;
pub mod transaction;

pub use account::{AccountKind, ParseKindError};
pub use convention::DecimalConvention;
pub use field::{CanonicalField, FIELD_SYNONYMS};
pub use money::Money;
pub use transaction::{fingerprint, TransactionRecord};
