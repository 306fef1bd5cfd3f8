// ============================================================================
// src/session/mod.rs - One list view session
// ============================================================================
//
// A session owns the record store for one entity kind and keeps it in step
// with the backend: loads replace it, and create/update/delete apply the
// backend's answer to it. Once closed, answers that arrive late are dropped
// and the store is left as it was.
//
// ============================================================================

use crate::config::BoardConfig;
use crate::connection::{AuthProvider, Identity};
use crate::core::{BoardError, EntityKind, Record, RecordId, Result};
use crate::evaluator::FilterCriterion;
use crate::remote::RecordService;
use crate::services::EntityService;
use crate::storage::RecordStore;
use crate::view::{Projector, View, ViewState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Handle that can close a session from elsewhere, e.g. while one of its
/// backend calls is still pending.
#[derive(Debug, Clone)]
pub struct SessionCloser {
    kind: EntityKind,
    active: Arc<AtomicBool>,
}

impl SessionCloser {
    pub fn close(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!(kind = %self.kind, "session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        !self.active.load(Ordering::SeqCst)
    }
}

pub struct BoardSession {
    store: RecordStore,
    service: EntityService,
    state: ViewState,
    projector: Projector,
    identity: Option<Identity>,
    closer: SessionCloser,
}

impl BoardSession {
    pub fn new(kind: EntityKind, remote: Arc<dyn RecordService>, config: &BoardConfig) -> Result<Self> {
        config.validate()?;
        if remote.kind() != kind {
            return Err(BoardError::Config(format!(
                "a {} session cannot use a {} backend",
                kind,
                remote.kind()
            )));
        }

        let key = config.sort_key_for(kind)?;
        let mut state = ViewState::new(kind);
        state.set_sort(key.field, key.direction)?;

        info!(%kind, "session opened");
        Ok(Self {
            store: RecordStore::new(kind),
            service: EntityService::new(kind, remote).with_page_size(config.page_size),
            state,
            projector: Projector::default().with_missing_policy(config.missing_dates),
            identity: None,
            closer: SessionCloser {
                kind,
                active: Arc::new(AtomicBool::new(true)),
            },
        })
    }

    /// Read the signed-in user from the identity provider.
    pub async fn attach_identity(&mut self, auth: &dyn AuthProvider) {
        self.identity = auth.current_user().await;
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn kind(&self) -> EntityKind {
        self.store.kind()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    pub fn closer(&self) -> SessionCloser {
        self.closer.clone()
    }

    pub fn close(&self) {
        self.closer.close();
    }

    pub fn is_active(&self) -> bool {
        !self.closer.is_closed()
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(BoardError::SessionClosed(self.kind()))
        }
    }

    /// Drop an answer that arrived after close.
    fn accept_late<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if self.is_active() {
            return result;
        }
        debug!(kind = %self.kind(), operation, "discarding result that arrived after close");
        Err(BoardError::SessionClosed(self.kind()))
    }

    /// Current filter and sort applied to the store.
    pub fn view(&self) -> Result<View<'_>> {
        self.projector.project_state(&self.store, &self.state)
    }

    pub fn select_preset(&mut self, name: &str) -> Result<()> {
        self.state.select_preset(name)
    }

    pub fn set_filter(&mut self, criterion: FilterCriterion) {
        self.state.set_criterion(criterion);
    }

    pub fn toggle_sort(&mut self, key: &str) -> Result<()> {
        self.state.toggle_sort(key)
    }

    /// Replace the store with the backend's current rows.
    pub async fn refresh(&mut self) -> Result<usize> {
        self.ensure_active()?;
        let result = self.service.fetch_all().await;
        let rows = self.accept_late("refresh", result)?;
        self.store.load(rows)?;
        info!(kind = %self.kind(), records = self.store.len(), "loaded records");
        Ok(self.store.len())
    }

    pub async fn create(&mut self, payload: &Record) -> Result<RecordId> {
        self.ensure_active()?;
        let result = self.service.create(payload).await;
        let created = self.accept_late("create", result)?;
        self.store.insert(created)
    }

    /// Send an edit and store the backend's version of the record.
    ///
    /// With a delete of the same record in flight, whichever answer is
    /// applied last wins; an edit landing after the delete is `NotFound`.
    pub async fn update(&mut self, id: &RecordId, payload: &Record) -> Result<()> {
        self.ensure_active()?;
        let result = self.service.update(id, payload).await;
        let updated = self.accept_late("update", result)?;
        self.store.update(id, updated)?;
        Ok(())
    }

    /// Delete on the backend, then drop the record locally.
    ///
    /// An id the backend does not know is `NotFound` and the store is left
    /// alone.
    pub async fn delete(&mut self, id: &RecordId) -> Result<bool> {
        self.ensure_active()?;
        let result = self.service.delete(id).await;
        let deleted = self.accept_late("delete", result)?;
        if self.store.contains(id) {
            self.store.remove(id)?;
        } else {
            warn!(kind = %self.kind(), %id, "deleted record was not in the local store");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::StaticAuthProvider;
    use crate::executor::SortDirection;
    use crate::remote::InMemoryRecordService;

    async fn session() -> BoardSession {
        let remote = Arc::new(InMemoryRecordService::new(EntityKind::Task));
        remote
            .seed(vec![
                Record::new(1).with("title", "b").with("priority", "Low"),
                Record::new(2).with("title", "a").with("priority", "High"),
            ])
            .await;
        BoardSession::new(EntityKind::Task, remote, &BoardConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_and_view() {
        let mut session = session().await;
        assert_eq!(session.refresh().await.unwrap(), 2);

        session.toggle_sort("priority").unwrap();
        session.toggle_sort("priority").unwrap();
        let view = session.view().unwrap();
        assert_eq!(view.ids(), vec![RecordId::Int(2), RecordId::Int(1)]);
    }

    #[tokio::test]
    async fn test_crud_keeps_store_in_step() {
        let mut session = session().await;
        session.refresh().await.unwrap();

        let id = session
            .create(&Record::empty().with("title", "c"))
            .await
            .unwrap();
        assert_eq!(session.store().len(), 3);

        session
            .update(&id, &Record::empty().with("title", "c2"))
            .await
            .unwrap();
        assert_eq!(session.store().get(&id).and_then(|r| r.text("title")), Some("c2"));

        assert!(session.delete(&id).await.unwrap());
        assert!(!session.store().contains(&id));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_calls() {
        let mut session = session().await;
        session.close();
        assert!(!session.is_active());
        assert!(matches!(
            session.refresh().await,
            Err(BoardError::SessionClosed(EntityKind::Task))
        ));
        assert!(session.store().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_backend_kind() {
        let remote = Arc::new(InMemoryRecordService::new(EntityKind::Project));
        assert!(matches!(
            BoardSession::new(EntityKind::Task, remote, &BoardConfig::default()),
            Err(BoardError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_config_sort_and_identity() {
        let remote = Arc::new(InMemoryRecordService::new(EntityKind::Task));
        let config = BoardConfig::new().default_sort(EntityKind::Task, "title", SortDirection::Descending);
        let mut session = BoardSession::new(EntityKind::Task, remote, &config).unwrap();
        assert_eq!(session.state().sort_key(), "title");
        assert_eq!(session.state().direction(), SortDirection::Descending);

        let auth = StaticAuthProvider::signed_in(Identity::new("Ada", "", ""));
        session.attach_identity(&auth).await;
        assert_eq!(session.identity().map(|i| i.display_name()), Some("Ada".to_string()));
    }
}
