pub mod convert;
pub mod csv;
pub mod ofx;

pub use crate::convert::{convert, Conversion, ConvertedDocument};
pub use crate::csv::{ColumnMap, ConversionProfile, CsvError, ParsedStatement, SkipReason, SkippedRow};
pub use crate::ofx::{build, OfxDocument};
