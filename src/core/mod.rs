pub mod error;
pub mod types;
pub mod value;

pub use error::{BoardError, Result, ValidationErrors};
pub use types::{EntityKind, ID_FIELDS, Record, RecordId};
pub use value::{Value, parse_timestamp_millis};
