pub mod store;

pub use store::{Entry, RecordStore, StoreSnapshot, entries_of};
