pub mod collation;
pub mod sort;

pub use collation::locale_compare;
pub use sort::{MissingValuePolicy, RecordComparator, SortDirection, SortExecutor, SortKey, SortValue};
