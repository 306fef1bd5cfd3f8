// ============================================================================
// taskboard library
// ============================================================================
//
// In-memory collection views over task and project records: a record store,
// a filter engine, a stable sort engine and a view projector, plus the
// backends, services and session that feed them.
//
// ============================================================================

pub mod cli;
pub mod config;
pub mod connection;
pub mod core;
pub mod dashboard;
pub mod evaluator;
pub mod executor;
pub mod forms;
pub mod remote;
pub mod result;
pub mod schema;
pub mod services;
pub mod session;
pub mod storage;
pub mod view;

// Re-export main types for convenience
pub use config::BoardConfig;
pub use core::{BoardError, EntityKind, Record, RecordId, Result, ValidationErrors, Value};
pub use evaluator::{Filter, FilterCriterion, FilterValue};
pub use executor::{MissingValuePolicy, SortDirection, SortKey};
pub use result::ViewResult;
pub use schema::RankTables;
pub use storage::{RecordStore, StoreSnapshot};
pub use view::{Projector, View, ViewState, project};

// Re-export collaborator API
pub use connection::{AuthProvider, Identity, StaticAuthProvider};
pub use remote::{
    Condition, InMemoryRecordService, ListQuery, LocalFileRecordService, RecordService,
};
pub use services::{ProjectService, QuickTaskService, TaskService};
pub use session::{BoardSession, SessionCloser};
