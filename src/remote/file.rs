use super::{BackendLayout, ListQuery, RecordService};
use crate::core::{BoardError, EntityKind, Record, RecordId, Result};
use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Record service persisting one table as a JSON array on disk.
///
/// Every call re-reads the file, so several services (or processes) see
/// each other's writes. Writes go to a temp file in the same directory and
/// are renamed over the target. Ids are v4 UUID strings.
pub struct LocalFileRecordService {
    kind: EntityKind,
    layout: BackendLayout,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalFileRecordService {
    pub fn new(kind: EntityKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            layout: BackendLayout::for_kind(kind),
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// One file per table inside `dir`, named after the table.
    pub fn in_dir(kind: EntityKind, dir: impl AsRef<Path>) -> Self {
        let file = format!("{}.json", crate::schema::schema(kind).table);
        Self::new(kind, dir.as_ref().join(file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Record>> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_all(&self, rows: &[Record]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(rows)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || atomic_write(&path, &bytes))
            .await
            .map_err(|err| BoardError::Io(io::Error::other(err)))??;
        debug!(kind = %self.kind, path = %self.path.display(), rows = rows.len(), "wrote data file");
        Ok(())
    }

    fn position(rows: &[Record], id: &RecordId) -> Option<usize> {
        rows.iter().position(|r| r.id().as_ref() == Some(id))
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| BoardError::Io(err.error))?;
    Ok(())
}

#[async_trait]
impl RecordService for LocalFileRecordService {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<Record>> {
        let rows = self.read_all().await?;
        Ok(query.apply(rows))
    }

    async fn get(&self, id: &RecordId, fields: &[String]) -> Result<Record> {
        let rows = self.read_all().await?;
        let record = Self::position(&rows, id)
            .map(|i| &rows[i])
            .ok_or_else(|| BoardError::not_found(self.kind, id.clone()))?;
        if fields.is_empty() {
            return Ok(record.clone());
        }
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        Ok(record.project_fields(&fields))
    }

    async fn create(&self, record: Record) -> Result<Record> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read_all().await?;
        let id = RecordId::Text(Uuid::new_v4().to_string());
        let created = self.layout.stamp_created(record, id.clone());
        rows.push(created.clone());
        self.write_all(&rows).await?;
        info!(kind = %self.kind, %id, "created record");
        Ok(created)
    }

    async fn update(&self, id: &RecordId, record: Record) -> Result<Record> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read_all().await?;
        let index = Self::position(&rows, id)
            .ok_or_else(|| BoardError::not_found(self.kind, id.clone()))?;
        let updated = self.layout.stamp_updated(&rows[index], record);
        rows[index] = updated.clone();
        self.write_all(&rows).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &RecordId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read_all().await?;
        let index = Self::position(&rows, id)
            .ok_or_else(|| BoardError::not_found(self.kind, id.clone()))?;
        rows.remove(index);
        self.write_all(&rows).await?;
        info!(kind = %self.kind, %id, "deleted record");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty_table() {
        let dir = TempDir::new().unwrap();
        let service = LocalFileRecordService::in_dir(EntityKind::QuickTask, dir.path());
        assert!(service.list(ListQuery::default()).await.unwrap().is_empty());
        assert!(!service.path().exists());
    }

    #[tokio::test]
    async fn test_quick_task_layout() {
        let dir = TempDir::new().unwrap();
        let service = LocalFileRecordService::in_dir(EntityKind::QuickTask, dir.path());
        let created = service
            .create(Record::empty().with("title", "Buy milk").with("completed", false))
            .await
            .unwrap();

        assert!(matches!(created.id(), Some(RecordId::Text(_))));
        assert_eq!(created.id_field(), Some("id"));
        assert!(created.contains("createdAt"));
        assert!(!created.contains("ModifiedOn"));
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let id = {
            let service = LocalFileRecordService::in_dir(EntityKind::Task, dir.path());
            let created = service.create(Record::empty().with("title", "a")).await.unwrap();
            created.require_id().unwrap()
        };

        let reopened = LocalFileRecordService::in_dir(EntityKind::Task, dir.path());
        let record = reopened.get(&id, &[]).await.unwrap();
        assert_eq!(record.text("title"), Some("a"));

        assert!(reopened.delete(&id).await.unwrap());
        assert!(reopened.list(ListQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let service = LocalFileRecordService::in_dir(EntityKind::Task, dir.path());
        service.create(Record::empty().with("title", "keep")).await.unwrap();

        let err = service.delete(&RecordId::from("nope")).await.unwrap_err();
        assert!(matches!(err, BoardError::NotFound { kind: EntityKind::Task, .. }));
        assert_eq!(service.list(ListQuery::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let service = LocalFileRecordService::new(EntityKind::Task, dir.path().join("tasks.json"));
        std::fs::write(service.path(), b"{not json").unwrap();
        let err = service.list(ListQuery::default()).await.unwrap_err();
        assert!(matches!(err, BoardError::Serialization(_)));
    }
}
