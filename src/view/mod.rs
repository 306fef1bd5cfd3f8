// ============================================================================
// src/view/mod.rs - View projector
// ============================================================================
//
// project = filter, then stable sort, over borrowed records. Nothing is
// cached: every call recomputes from whatever collection it is handed, and
// the collection itself is never touched.
//
// ============================================================================

pub mod state;

pub use state::ViewState;

use crate::core::{BoardError, EntityKind, Record, RecordId, Result, Value};
use crate::evaluator::{Filter, FilterCriterion};
use crate::executor::{MissingValuePolicy, SortDirection, SortExecutor, SortKey};
use crate::result::ViewResult;
use crate::schema::RankTables;
use crate::storage::{Entry, RecordStore};
use tracing::debug;

/// Read-only, ordered result of a projection.
#[derive(Debug, Clone)]
pub struct View<'a> {
    kind: EntityKind,
    key: SortKey,
    entries: Vec<Entry<'a>>,
}

impl<'a> View<'a> {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn sort_key(&self) -> SortKey {
        self.key
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.entries.iter().map(|e| e.record)
    }

    pub fn first(&self) -> Option<&'a Record> {
        self.entries.first().map(|e| e.record)
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.iter().filter_map(Record::id).collect()
    }

    /// Keep at most `n` records from the front.
    pub fn take(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    pub fn to_records(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }

    /// Tabulate the named fields; missing fields render empty.
    pub fn to_result(&self, fields: &[&str]) -> ViewResult {
        let columns = fields.iter().map(|f| f.to_string()).collect();
        let rows = self
            .iter()
            .map(|record| {
                fields
                    .iter()
                    .map(|f| record.get(f).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        ViewResult::new(columns, rows)
    }
}

/// Filter + sort over borrowed records.
#[derive(Debug, Clone)]
pub struct Projector {
    ranks: RankTables,
    missing: MissingValuePolicy,
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(RankTables::standard())
    }
}

impl Projector {
    pub fn new(ranks: RankTables) -> Self {
        Self {
            ranks,
            missing: MissingValuePolicy::default(),
        }
    }

    pub fn with_missing_policy(mut self, missing: MissingValuePolicy) -> Self {
        self.missing = missing;
        self
    }

    pub fn ranks(&self) -> &RankTables {
        &self.ranks
    }

    pub fn missing_policy(&self) -> MissingValuePolicy {
        self.missing
    }

    /// Validate a criterion and sort key, then project.
    pub fn project<'a>(
        &self,
        kind: EntityKind,
        entries: impl IntoIterator<Item = Entry<'a>>,
        criterion: &FilterCriterion,
        sort_key: &str,
        direction: SortDirection,
    ) -> Result<View<'a>> {
        let filter = Filter::compile(kind, criterion.clone())?;
        let key = SortKey::new(kind, sort_key, direction)?.with_missing_policy(self.missing);
        self.project_with(entries, &filter, key)
    }

    /// Project with an already compiled filter and key.
    ///
    /// The key's own missing-value policy is used as given.
    pub fn project_with<'a>(
        &self,
        entries: impl IntoIterator<Item = Entry<'a>>,
        filter: &Filter,
        key: SortKey,
    ) -> Result<View<'a>> {
        if filter.kind() != key.kind {
            return Err(BoardError::Config(format!(
                "filter for {} cannot be combined with a {} sort key",
                filter.kind(),
                key.kind
            )));
        }

        let mut input = 0usize;
        let mut selected: Vec<Entry<'a>> = entries
            .into_iter()
            .inspect(|_| input += 1)
            .filter(|entry| filter.matches(entry.record))
            .collect();

        SortExecutor::sort(&mut selected, key, &self.ranks);

        debug!(
            kind = %key.kind,
            key = key.field,
            direction = %key.direction,
            input,
            output = selected.len(),
            "projected view"
        );

        Ok(View {
            kind: key.kind,
            key,
            entries: selected,
        })
    }

    /// Project a store through the selections held in a view state.
    pub fn project_state<'a>(&self, store: &'a RecordStore, state: &ViewState) -> Result<View<'a>> {
        if store.kind() != state.kind() {
            return Err(BoardError::Config(format!(
                "view state for {} cannot project a {} store",
                state.kind(),
                store.kind()
            )));
        }
        self.project(
            store.kind(),
            store.entries(),
            state.criterion(),
            state.sort_key(),
            state.direction(),
        )
    }
}

/// Project a store with the stock rank tables and missing-value policy.
pub fn project<'a>(
    store: &'a RecordStore,
    criterion: &FilterCriterion,
    sort_key: &str,
    direction: SortDirection,
) -> Result<View<'a>> {
    Projector::default().project(store.kind(), store.entries(), criterion, sort_key, direction)
}
