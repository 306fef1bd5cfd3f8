// ============================================================================
// src/remote/mod.rs - Record persistence collaborator
// ============================================================================
//
// Design Patterns:
// - Repository Pattern: one async RecordService per entity table
// - Dependency Injection: callers hold `Arc<dyn RecordService>`
//
// Features:
// - List queries with field lists, AND-ed Eq/Gte/Lte conditions, ordering
//   and paging
// - Backend-assigned identity and CreatedOn/ModifiedOn stamps
// - Updates patch the stored record; omitted fields are kept
// - In-memory and JSON-file implementations
//
// ============================================================================

pub mod file;
pub mod memory;

pub use file::LocalFileRecordService;
pub use memory::InMemoryRecordService;

use crate::core::{EntityKind, Record, RecordId, Result, Value, parse_timestamp_millis};
use crate::executor::SortDirection;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_PAGE_LIMIT: usize = 100;

// ============================================================================
// QUERY TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOp {
    Eq,
    Gte,
    Lte,
}

/// One `field <op> value` test. Conditions in a query are AND-ed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub op: ConditionOp,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: ConditionOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, ConditionOp::Eq, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, ConditionOp::Gte, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, ConditionOp::Lte, value)
    }

    /// Missing fields never satisfy a condition.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.get(&self.field).filter(|v| !v.is_null()) else {
            return false;
        };
        match self.op {
            ConditionOp::Eq => actual == &self.value,
            ConditionOp::Gte => compare_stored(actual, &self.value) != Ordering::Less,
            ConditionOp::Lte => compare_stored(actual, &self.value) != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Parameters of a `RecordService::list` call.
///
/// An empty field list returns whole records. The default order is newest
/// first by `CreatedOn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    pub fields: Vec<String>,
    pub filter: Vec<Condition>,
    pub order: Vec<OrderBy>,
    pub page: Page,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            filter: Vec::new(),
            order: vec![OrderBy::new("CreatedOn", SortDirection::Descending)],
            page: Page::default(),
        }
    }
}

impl ListQuery {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.filter.push(condition);
        self
    }

    /// Replace the ordering.
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order = vec![OrderBy::new(field, direction)];
        self
    }

    pub fn then_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order.push(OrderBy::new(field, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.page.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.page.offset = offset;
        self
    }

    /// Run the query over a full table held in storage order.
    pub fn apply(&self, rows: impl IntoIterator<Item = Record>) -> Vec<Record> {
        let mut selected: Vec<Record> = rows
            .into_iter()
            .filter(|r| self.filter.iter().all(|c| c.matches(r)))
            .collect();

        // stable: rows equal on every order field stay in storage order
        selected.sort_by(|a, b| {
            self.order.iter().fold(Ordering::Equal, |acc, order| {
                acc.then_with(|| {
                    let ord = compare_optional(a.get(&order.field), b.get(&order.field));
                    if order.direction.is_descending() {
                        ord.reverse()
                    } else {
                        ord
                    }
                })
            })
        });

        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        selected
            .into_iter()
            .skip(self.page.offset)
            .take(self.page.limit)
            .map(|r| if fields.is_empty() { r } else { r.project_fields(&fields) })
            .collect()
    }
}

/// Backend-side ordering: missing first, then dates, numbers, text.
fn compare_optional(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_stored(a, b),
    }
}

fn compare_stored(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    if let (Value::Text(x), Value::Text(y)) = (a, b) {
        if let (Some(x), Some(y)) = (parse_timestamp_millis(x), parse_timestamp_millis(y)) {
            return x.cmp(&y);
        }
    }
    a.to_string().cmp(&b.to_string())
}

// ============================================================================
// BACKEND LAYOUT
// ============================================================================

/// Which fields a backend owns for an entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendLayout {
    pub id_field: &'static str,
    pub created_field: &'static str,
    pub modified_field: Option<&'static str>,
}

impl BackendLayout {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Task | EntityKind::Project => Self {
                id_field: "Id",
                created_field: "CreatedOn",
                modified_field: Some("ModifiedOn"),
            },
            EntityKind::QuickTask => Self {
                id_field: "id",
                created_field: "createdAt",
                modified_field: None,
            },
        }
    }

    /// Stamp a freshly created record. Client-sent identity is discarded.
    pub fn stamp_created(&self, mut record: Record, id: RecordId) -> Record {
        for field in crate::core::ID_FIELDS {
            record.remove(field);
        }
        let now = now_timestamp();
        record.set(self.id_field, id.to_value());
        record.set(self.created_field, now.clone());
        if let Some(modified) = self.modified_field {
            record.set(modified, now);
        }
        record
    }

    /// Overlay `patch` on `stored`. Identity and the creation stamp always
    /// come from `stored`; fields the patch leaves out are kept.
    pub fn stamp_updated(&self, stored: &Record, patch: Record) -> Record {
        let mut record = stored.clone();
        for (field, value) in patch.fields() {
            if crate::core::ID_FIELDS.contains(&field) || field == self.created_field {
                continue;
            }
            record.set(field, value.clone());
        }
        if let Some(modified) = self.modified_field {
            record.set(modified, now_timestamp());
        }
        record
    }
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// SERVICE TRAIT
// ============================================================================

#[async_trait]
pub trait RecordService: Send + Sync {
    fn kind(&self) -> EntityKind;

    async fn list(&self, query: ListQuery) -> Result<Vec<Record>>;

    /// Fetch one record; an empty field list returns it whole.
    async fn get(&self, id: &RecordId, fields: &[String]) -> Result<Record>;

    async fn create(&self, record: Record) -> Result<Record>;

    async fn update(&self, id: &RecordId, record: Record) -> Result<Record>;

    /// Remove one record; `NotFound` when the id is unknown.
    async fn delete(&self, id: &RecordId) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, due: Option<&str>, created: &str) -> Record {
        Record::empty()
            .with("Id", id)
            .with("due_date", due)
            .with("CreatedOn", created)
    }

    fn ids(records: &[Record]) -> Vec<RecordId> {
        records.iter().filter_map(Record::id).collect()
    }

    #[test]
    fn test_default_query() {
        let query = ListQuery::default();
        assert_eq!(query.page, Page { limit: 100, offset: 0 });
        assert_eq!(query.order, vec![OrderBy::new("CreatedOn", SortDirection::Descending)]);
    }

    #[test]
    fn test_default_order_is_newest_first() {
        let rows = vec![
            task(1, None, "2024-01-01T00:00:00Z"),
            task(2, None, "2024-03-01T00:00:00Z"),
            task(3, None, "2024-02-01T00:00:00Z"),
        ];
        let out = ListQuery::default().apply(rows);
        assert_eq!(ids(&out), vec![RecordId::Int(2), RecordId::Int(3), RecordId::Int(1)]);
    }

    #[test]
    fn test_date_range_conditions() {
        let rows = vec![
            task(1, Some("2024-01-05"), "2024-01-01"),
            task(2, Some("2024-01-20"), "2024-01-01"),
            task(3, None, "2024-01-01"),
            task(4, Some("2024-02-01"), "2024-01-01"),
        ];
        let query = ListQuery::default()
            .with_condition(Condition::gte("due_date", "2024-01-01"))
            .with_condition(Condition::lte("due_date", "2024-01-31"))
            .order_by("due_date", SortDirection::Ascending);
        assert_eq!(ids(&query.apply(rows)), vec![RecordId::Int(1), RecordId::Int(2)]);
    }

    #[test]
    fn test_paging_and_field_list() {
        let rows: Vec<Record> = (1..=5)
            .map(|i| task(i, None, "2024-01-01").with("title", format!("t{i}")))
            .collect();
        let out = ListQuery::new(&["title"])
            .order_by("Id", SortDirection::Ascending)
            .offset(1)
            .limit(2)
            .apply(rows);
        assert_eq!(ids(&out), vec![RecordId::Int(2), RecordId::Int(3)]);
        assert!(out[0].get("CreatedOn").is_none());
        assert_eq!(out[0].text("title"), Some("t2"));
    }

    #[test]
    fn test_eq_condition_on_missing_field() {
        let cond = Condition::eq("status", "Completed");
        assert!(!cond.matches(&Record::new(1)));
        assert!(cond.matches(&Record::new(1).with("status", "Completed")));
    }

    #[test]
    fn test_layout_stamps() {
        let layout = BackendLayout::for_kind(EntityKind::Task);
        let created = layout.stamp_created(Record::new(99).with("title", "x"), RecordId::Int(1));
        assert_eq!(created.id(), Some(RecordId::Int(1)));
        assert!(created.get("id").is_none());
        assert!(created.contains("CreatedOn"));
        assert_eq!(created.get("CreatedOn"), created.get("ModifiedOn"));

        let updated = layout.stamp_updated(
            &created,
            Record::empty().with("title", "y").with("CreatedOn", "1999-01-01"),
        );
        assert_eq!(updated.get("CreatedOn"), created.get("CreatedOn"));
        assert_eq!(updated.id(), Some(RecordId::Int(1)));
        assert_eq!(updated.text("title"), Some("y"));

        let patched = layout.stamp_updated(&updated, Record::empty().with("status", "Completed"));
        assert_eq!(patched.text("title"), Some("y"));
        assert_eq!(patched.text("status"), Some("Completed"));
    }
}
