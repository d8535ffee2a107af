use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, instrument};

use super::{ChangeEvent, ChangeKind, RemoteTable, StoreError};
use crate::mirror_framework::Record;

const CHANGE_FEED_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct FailurePlan {
    fetch: Option<StoreError>,
    insert: Option<StoreError>,
    update: Option<StoreError>,
}

/// In-process table used by the demo binary and the tests.
///
/// Besides the [`RemoteTable`] operations it can simulate writes made by other
/// sessions ([`MemoryTable::insert_external`], [`MemoryTable::touch`]) and
/// fail the next call of a given kind.
pub struct MemoryTable<R: Record> {
    rows: Mutex<Vec<R>>,
    failures: Mutex<FailurePlan>,
    events: broadcast::Sender<ChangeEvent>,
    fetches: AtomicUsize,
}

impl<R: Record> Default for MemoryTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> MemoryTable<R> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Starts with `rows` already present, keeping their `created_at`.
    pub fn with_rows(rows: Vec<R>) -> Self {
        let (events, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            rows: Mutex::new(rows),
            failures: Mutex::new(FailurePlan::default()),
            events,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch_all` calls served so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub async fn fail_next_fetch(&self, error: StoreError) {
        self.failures.lock().await.fetch = Some(error);
    }

    pub async fn fail_next_insert(&self, error: StoreError) {
        self.failures.lock().await.insert = Some(error);
    }

    pub async fn fail_next_update(&self, error: StoreError) {
        self.failures.lock().await.update = Some(error);
    }

    /// Writes a row as another session would, keeping its `created_at`.
    pub async fn insert_external(&self, row: R) {
        self.rows.lock().await.push(row);
        self.notify(ChangeKind::Insert);
    }

    /// Fires a change event without touching any row.
    pub fn touch(&self, kind: ChangeKind) {
        self.notify(kind);
    }

    fn notify(&self, kind: ChangeKind) {
        // No subscribers is not an error.
        let _ = self.events.send(ChangeEvent { table: R::TABLE, kind });
    }
}

#[async_trait]
impl<R: Record> RemoteTable<R> for MemoryTable<R> {
    #[instrument(name = "memory_fetch_all", skip(self), fields(table = R::TABLE))]
    async fn fetch_all(&self) -> Result<Vec<R>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().await.fetch.take() {
            return Err(error);
        }
        let mut rows = self.rows.lock().await.clone();
        rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        debug!(row_count = rows.len(), "Served full read");
        Ok(rows)
    }

    #[instrument(name = "memory_insert", skip(self, row), fields(table = R::TABLE, id = %row.id()))]
    async fn insert(&self, mut row: R) -> Result<R, StoreError> {
        if let Some(error) = self.failures.lock().await.insert.take() {
            return Err(error);
        }
        {
            let mut rows = self.rows.lock().await;
            if rows.iter().any(|existing| existing.id() == row.id()) {
                return Err(StoreError::Conflict(row.id().to_string()));
            }
            row.set_created_at(Utc::now());
            rows.push(row.clone());
        }
        self.notify(ChangeKind::Insert);
        Ok(row)
    }

    #[instrument(name = "memory_update_status", skip(self), fields(table = R::TABLE))]
    async fn update_status(&self, id: &str, status: R::Status) -> Result<R, StoreError> {
        if let Some(error) = self.failures.lock().await.update.take() {
            return Err(error);
        }
        let updated = {
            let mut rows = self.rows.lock().await;
            let row = rows
                .iter_mut()
                .find(|row| row.id() == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            row.set_status(status);
            row.clone()
        };
        self.notify(ChangeKind::Update);
        Ok(updated)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}
