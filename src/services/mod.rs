// ============================================================================
// src/services/mod.rs - Entity services over a record backend
// ============================================================================
//
// Each service knows its entity's field list and which fields a create or
// update may carry; anything else in a payload is dropped before it reaches
// the backend.
//
// ============================================================================

use crate::core::{EntityKind, Record, RecordId, Result, Value};
use crate::executor::SortDirection;
use crate::remote::{Condition, ListQuery, RecordService, now_timestamp};
use crate::schema::{EntitySchema, schema};
use std::sync::Arc;
use tracing::debug;

/// CRUD for one entity kind, shared by the typed services.
#[derive(Clone)]
pub struct EntityService {
    schema: &'static EntitySchema,
    remote: Arc<dyn RecordService>,
    page_size: usize,
}

impl EntityService {
    pub fn new(kind: EntityKind, remote: Arc<dyn RecordService>) -> Self {
        Self {
            schema: schema(kind),
            remote,
            page_size: crate::remote::DEFAULT_PAGE_LIMIT,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.schema.kind
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.schema.fields
    }

    pub fn remote(&self) -> &Arc<dyn RecordService> {
        &self.remote
    }

    /// Base query: the entity's field list, newest first, one page.
    pub fn query(&self) -> ListQuery {
        let (created, _) = created_order(self.kind());
        ListQuery::new(self.schema.fields)
            .order_by(created, SortDirection::Descending)
            .limit(self.page_size)
    }

    /// Keep only editable fields.
    pub fn payload(&self, record: &Record) -> Record {
        let mut payload = Record::empty();
        for field in self.schema.editable_fields {
            if let Some(value) = record.get(field) {
                payload.set(*field, value.clone());
            }
        }
        payload
    }

    pub async fn fetch_all(&self) -> Result<Vec<Record>> {
        self.fetch(self.query()).await
    }

    pub async fn fetch(&self, query: ListQuery) -> Result<Vec<Record>> {
        let rows = self.remote.list(query).await?;
        debug!(kind = %self.kind(), rows = rows.len(), "fetched records");
        Ok(rows)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Record> {
        let fields: Vec<String> = self.schema.fields.iter().map(|f| f.to_string()).collect();
        self.remote.get(id, &fields).await
    }

    pub async fn create(&self, record: &Record) -> Result<Record> {
        self.remote.create(self.payload(record)).await
    }

    pub async fn update(&self, id: &RecordId, record: &Record) -> Result<Record> {
        self.remote.update(id, self.payload(record)).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<bool> {
        self.remote.delete(id).await
    }

    pub async fn by_status(&self, status: &str) -> Result<Vec<Record>> {
        self.fetch(
            self.query()
                .with_condition(Condition::eq(self.schema.status_field, status)),
        )
        .await
    }
}

fn created_order(kind: EntityKind) -> (&'static str, SortDirection) {
    match kind {
        EntityKind::QuickTask => ("createdAt", SortDirection::Descending),
        EntityKind::Task | EntityKind::Project => ("CreatedOn", SortDirection::Descending),
    }
}

// ============================================================================
// TASKS
// ============================================================================

#[derive(Clone)]
pub struct TaskService {
    inner: EntityService,
}

impl TaskService {
    pub fn new(remote: Arc<dyn RecordService>) -> Self {
        Self {
            inner: EntityService::new(EntityKind::Task, remote),
        }
    }

    pub fn entity(&self) -> &EntityService {
        &self.inner
    }

    pub fn with_page_size(self, page_size: usize) -> Self {
        Self {
            inner: self.inner.with_page_size(page_size),
        }
    }

    pub async fn fetch_all(&self) -> Result<Vec<Record>> {
        self.inner.fetch_all().await
    }

    pub async fn get(&self, id: &RecordId) -> Result<Record> {
        self.inner.get(id).await
    }

    pub async fn create(&self, record: &Record) -> Result<Record> {
        self.inner.create(record).await
    }

    pub async fn update(&self, id: &RecordId, record: &Record) -> Result<Record> {
        self.inner.update(id, record).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<bool> {
        self.inner.delete(id).await
    }

    pub async fn by_status(&self, status: &str) -> Result<Vec<Record>> {
        self.inner.by_status(status).await
    }

    pub async fn by_priority(&self, priority: &str) -> Result<Vec<Record>> {
        let query = self
            .inner
            .query()
            .with_condition(Condition::eq("priority", priority));
        self.inner.fetch(query).await
    }

    /// Tasks due within `[start, end]`, both inclusive.
    pub async fn by_due_date(&self, start: &str, end: &str) -> Result<Vec<Record>> {
        let query = self
            .inner
            .query()
            .with_condition(Condition::gte("due_date", start))
            .with_condition(Condition::lte("due_date", end));
        self.inner.fetch(query).await
    }
}

// ============================================================================
// PROJECTS
// ============================================================================

#[derive(Clone)]
pub struct ProjectService {
    inner: EntityService,
}

impl ProjectService {
    pub fn new(remote: Arc<dyn RecordService>) -> Self {
        Self {
            inner: EntityService::new(EntityKind::Project, remote),
        }
    }

    pub fn entity(&self) -> &EntityService {
        &self.inner
    }

    pub fn with_page_size(self, page_size: usize) -> Self {
        Self {
            inner: self.inner.with_page_size(page_size),
        }
    }

    pub async fn fetch_all(&self) -> Result<Vec<Record>> {
        self.inner.fetch_all().await
    }

    pub async fn get(&self, id: &RecordId) -> Result<Record> {
        self.inner.get(id).await
    }

    pub async fn create(&self, record: &Record) -> Result<Record> {
        self.inner.create(record).await
    }

    pub async fn update(&self, id: &RecordId, record: &Record) -> Result<Record> {
        self.inner.update(id, record).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<bool> {
        self.inner.delete(id).await
    }

    pub async fn by_status(&self, status: &str) -> Result<Vec<Record>> {
        self.inner.by_status(status).await
    }

    /// Projects starting on or after `start` and ending on or before `end`.
    pub async fn by_date_range(&self, start: &str, end: &str) -> Result<Vec<Record>> {
        let query = self
            .inner
            .query()
            .with_condition(Condition::gte("start_date", start))
            .with_condition(Condition::lte("end_date", end));
        self.inner.fetch(query).await
    }

    pub async fn ongoing(&self) -> Result<Vec<Record>> {
        self.by_status("In Progress").await
    }
}

// ============================================================================
// QUICK TASKS
// ============================================================================

#[derive(Clone)]
pub struct QuickTaskService {
    inner: EntityService,
}

impl QuickTaskService {
    pub fn new(remote: Arc<dyn RecordService>) -> Self {
        Self {
            inner: EntityService::new(EntityKind::QuickTask, remote),
        }
    }

    pub fn entity(&self) -> &EntityService {
        &self.inner
    }

    pub async fn fetch_all(&self) -> Result<Vec<Record>> {
        self.inner.fetch_all().await
    }

    /// New quick tasks start out pending.
    pub async fn create(&self, record: &Record) -> Result<Record> {
        let payload = self
            .inner
            .payload(record)
            .with("completed", false)
            .with("completedAt", Value::Null);
        self.inner.remote().create(payload).await
    }

    /// Edits stamp `updatedAt`; completion state is left alone.
    pub async fn update(&self, id: &RecordId, record: &Record) -> Result<Record> {
        let payload = self.inner.payload(record).with("updatedAt", now_timestamp());
        self.inner.remote().update(id, payload).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<bool> {
        self.inner.delete(id).await
    }

    /// Flip `completed`; completing stamps `completedAt`, reopening clears it.
    pub async fn toggle_completed(&self, id: &RecordId) -> Result<Record> {
        let current = self.inner.remote().get(id, &[]).await?;
        let completed = !current.get("completed").and_then(Value::as_bool).unwrap_or(false);
        let completed_at = if completed {
            Value::from(now_timestamp())
        } else {
            Value::Null
        };
        let patch = Record::empty()
            .with("completed", completed)
            .with("completedAt", completed_at);
        self.inner.remote().update(id, patch).await
    }
}
