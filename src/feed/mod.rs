//! Feed row parsing: mandatory field extraction plus the configured
//! optional-column overlay.

pub mod extract;
pub mod row;

pub use extract::{FieldExtractor, MIN_FIELD_COUNT, OptionalFieldSpec};
pub use row::PersonRow;
