use super::{BackendLayout, ListQuery, RecordService};
use crate::core::{BoardError, EntityKind, Record, RecordId, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Record>,
    next_id: i64,
    failure: Option<String>,
}

impl Table {
    fn position(&self, id: &RecordId) -> Option<usize> {
        self.rows.iter().position(|r| r.id().as_ref() == Some(id))
    }

    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(BoardError::remote(message.clone())),
            None => Ok(()),
        }
    }
}

/// Hosted-backend stand-in keeping one table in memory.
///
/// Ids are sequential integers starting at 1. A failure message can be
/// injected so every call fails with `BoardError::Remote`, and a fixed
/// latency can be added to every call.
pub struct InMemoryRecordService {
    kind: EntityKind,
    layout: BackendLayout,
    latency: Option<Duration>,
    table: RwLock<Table>,
}

impl InMemoryRecordService {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            layout: BackendLayout::for_kind(kind),
            latency: None,
            table: RwLock::new(Table {
                next_id: 1,
                ..Table::default()
            }),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Seed rows as if they had been created earlier. Ids already present
    /// are kept; rows without one get the next free id.
    pub async fn seed(&self, records: Vec<Record>) {
        let mut table = self.table.write().await;
        for mut record in records {
            match record.id() {
                Some(RecordId::Int(id)) => table.next_id = table.next_id.max(id + 1),
                Some(RecordId::Text(_)) => {}
                None => {
                    let id = table.next_id;
                    table.next_id += 1;
                    record.set(self.layout.id_field, id);
                }
            }
            table.rows.push(record);
        }
    }

    /// Make every following call fail until cleared with `None`.
    pub async fn set_failure(&self, message: Option<&str>) {
        self.table.write().await.failure = message.map(str::to_string);
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RecordService for InMemoryRecordService {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<Record>> {
        self.delay().await;
        let table = self.table.read().await;
        table.check_failure()?;
        let rows = query.apply(table.rows.iter().cloned());
        debug!(kind = %self.kind, returned = rows.len(), "listed records");
        Ok(rows)
    }

    async fn get(&self, id: &RecordId, fields: &[String]) -> Result<Record> {
        self.delay().await;
        let table = self.table.read().await;
        table.check_failure()?;
        let record = table
            .position(id)
            .map(|i| &table.rows[i])
            .ok_or_else(|| BoardError::not_found(self.kind, id.clone()))?;
        if fields.is_empty() {
            return Ok(record.clone());
        }
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        Ok(record.project_fields(&fields))
    }

    async fn create(&self, record: Record) -> Result<Record> {
        self.delay().await;
        let mut table = self.table.write().await;
        table.check_failure()?;
        let id = table.next_id;
        table.next_id += 1;
        let created = self.layout.stamp_created(record, RecordId::Int(id));
        table.rows.push(created.clone());
        debug!(kind = %self.kind, id, "created record");
        Ok(created)
    }

    async fn update(&self, id: &RecordId, record: Record) -> Result<Record> {
        self.delay().await;
        let mut table = self.table.write().await;
        table.check_failure()?;
        let index = table
            .position(id)
            .ok_or_else(|| BoardError::not_found(self.kind, id.clone()))?;
        let updated = self.layout.stamp_updated(&table.rows[index], record);
        table.rows[index] = updated.clone();
        debug!(kind = %self.kind, %id, "updated record");
        Ok(updated)
    }

    async fn delete(&self, id: &RecordId) -> Result<bool> {
        self.delay().await;
        let mut table = self.table.write().await;
        table.check_failure()?;
        let index = table
            .position(id)
            .ok_or_else(|| BoardError::not_found(self.kind, id.clone()))?;
        table.rows.remove(index);
        debug!(kind = %self.kind, %id, "deleted record");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SortDirection;

    #[tokio::test]
    async fn test_create_assigns_ids_and_stamps() {
        let service = InMemoryRecordService::new(EntityKind::Task);
        let first = service.create(Record::empty().with("title", "a")).await.unwrap();
        let second = service.create(Record::empty().with("title", "b")).await.unwrap();

        assert_eq!(first.id(), Some(RecordId::Int(1)));
        assert_eq!(second.id(), Some(RecordId::Int(2)));
        assert!(first.contains("CreatedOn"));
        assert!(first.contains("ModifiedOn"));
        assert_eq!(service.len().await, 2);
    }

    #[tokio::test]
    async fn test_get_update_delete() {
        let service = InMemoryRecordService::new(EntityKind::Task);
        let created = service.create(Record::empty().with("title", "a")).await.unwrap();
        let id = created.require_id().unwrap();

        let updated = service
            .update(&id, Record::empty().with("title", "b"))
            .await
            .unwrap();
        assert_eq!(updated.text("title"), Some("b"));
        assert_eq!(updated.get("CreatedOn"), created.get("CreatedOn"));

        let fetched = service.get(&id, &["title".to_string()]).await.unwrap();
        assert_eq!(fetched.text("title"), Some("b"));
        assert!(fetched.get("CreatedOn").is_none());

        assert!(service.delete(&id).await.unwrap());
        assert!(service.delete(&id).await.unwrap_err().is_not_found());
        assert_eq!(service.len().await, 0);
        assert!(service.get(&id, &[]).await.unwrap_err().is_not_found());
        assert!(
            service
                .update(&id, Record::empty())
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let service = InMemoryRecordService::new(EntityKind::Project);
        service.set_failure(Some("backend down")).await;
        let err = service.list(ListQuery::default()).await.unwrap_err();
        assert!(matches!(err, BoardError::Remote(ref m) if m == "backend down"));

        service.set_failure(None).await;
        assert!(service.list(ListQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_keeps_ids() {
        let service = InMemoryRecordService::new(EntityKind::Task);
        service
            .seed(vec![Record::new(7).with("title", "x"), Record::empty().with("title", "y")])
            .await;
        let rows = service
            .list(ListQuery::default().order_by("title", SortDirection::Ascending))
            .await
            .unwrap();
        let ids: Vec<RecordId> = rows.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![RecordId::Int(7), RecordId::Int(8)]);
    }
}
