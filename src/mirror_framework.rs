use std::fmt::{Debug, Display};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::remote::{ChangeEvent, RemoteTable, StoreError};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// A row of a remote table that [`MirrorActor`] keeps a local copy of.
pub trait Record: Clone + Send + Sync + Debug + 'static {
    type Status: Copy + Eq + Send + Sync + Debug + Display + 'static;
    type Draft: Clone + Send + Sync + Debug + 'static;

    /// Remote table name, used in change events and logs.
    const TABLE: &'static str;

    /// The public identifier (`ORD-…`, `RSV-…`).
    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;
    fn set_created_at(&mut self, at: DateTime<Utc>);

    fn set_status(&mut self, status: Self::Status);

    /// Builds the row to insert. Initial statuses are fixed here, whatever the
    /// draft says; an `Err` rejects the draft before anything is written.
    fn from_draft(id: String, draft: Self::Draft) -> Result<Self, String>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid record: {0}")]
    Invalid(String),
    #[error("No unused id after {0} attempts")]
    IdSpaceExhausted(usize),
}

/// What readers see: the mirrored rows plus fetch bookkeeping.
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    /// Newest `created_at` first.
    pub rows: Arc<Vec<R>>,
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next successful one.
    pub error: Option<String>,
}

impl<R> Default for Snapshot<R> {
    fn default() -> Self {
        Self {
            rows: Arc::new(Vec::new()),
            loading: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MirrorSettings {
    pub buffer_size: usize,
    /// Change events arriving within this window share one re-fetch.
    pub refresh_debounce: Duration,
    pub id_attempts: usize,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            refresh_debounce: Duration::from_millis(150),
            id_attempts: 8,
        }
    }
}

// =============================================================================
// 2. THE MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum MirrorRequest<R: Record> {
    Create {
        draft: R::Draft,
        respond_to: Response<R>,
    },
    SetStatus {
        id: String,
        status: R::Status,
        respond_to: Response<R>,
    },
    Refetch {
        respond_to: Response<usize>,
    },
    Shutdown,
}

// =============================================================================
// 3. THE ACTOR
// =============================================================================

/// Owns the local copy of one remote table.
///
/// Writes and fetches are serialised through this task. Change events only
/// arm a refresh deadline; when it passes, one full fetch replaces the rows.
/// Successful writes patch the local rows right away so the writer reads its
/// own write before the refresh lands.
pub struct MirrorActor<R: Record> {
    receiver: mpsc::Receiver<MirrorRequest<R>>,
    remote: Arc<dyn RemoteTable<R>>,
    changes: broadcast::Receiver<ChangeEvent>,
    snapshot: watch::Sender<Snapshot<R>>,
    next_id_fn: Box<dyn Fn() -> String + Send + Sync>,
    settings: MirrorSettings,
}

impl<R: Record> MirrorActor<R> {
    pub fn new(
        remote: Arc<dyn RemoteTable<R>>,
        next_id_fn: impl Fn() -> String + Send + Sync + 'static,
        settings: MirrorSettings,
    ) -> (Self, MirrorClient<R>) {
        let (sender, receiver) = mpsc::channel(settings.buffer_size);
        let (snapshot, snapshot_rx) = watch::channel(Snapshot::default());
        // Subscribe before the first fetch so no change slips between them.
        let changes = remote.subscribe();
        let actor = Self {
            receiver,
            remote,
            changes,
            snapshot,
            next_id_fn: Box::new(next_id_fn),
            settings,
        };
        (actor, MirrorClient::new(sender, snapshot_rx))
    }

    #[instrument(name = "mirror", skip(self), fields(table = R::TABLE))]
    pub async fn run(mut self) {
        info!("Mirror starting");
        let _ = self.reload().await;

        let mut refresh_at: Option<Instant> = None;
        let mut feed_open = true;

        loop {
            let deadline = refresh_at;
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(MirrorRequest::Shutdown) | None => {
                        info!("Mirror shutting down");
                        break;
                    }
                    Some(request) => self.handle(request).await,
                },
                event = self.changes.recv(), if feed_open => match event {
                    Ok(event) => {
                        debug!(kind = ?event.kind, "Change event received");
                        refresh_at.get_or_insert_with(|| Instant::now() + self.settings.refresh_debounce);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Change feed lagged");
                        refresh_at.get_or_insert_with(|| Instant::now() + self.settings.refresh_debounce);
                    }
                    Err(RecvError::Closed) => {
                        warn!("Change feed closed; mirror will only refresh on request");
                        feed_open = false;
                    }
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    refresh_at = None;
                    let _ = self.reload().await;
                }
            }
        }
        info!("Mirror stopped");
    }

    async fn handle(&mut self, request: MirrorRequest<R>) {
        match request {
            MirrorRequest::Create { draft, respond_to } => {
                let result = self.handle_create(draft).await;
                let _ = respond_to.send(result);
            }
            MirrorRequest::SetStatus { id, status, respond_to } => {
                let result = self.handle_set_status(id, status).await;
                let _ = respond_to.send(result);
            }
            MirrorRequest::Refetch { respond_to } => {
                let result = self.reload().await.map_err(FrameworkError::from);
                let _ = respond_to.send(result);
            }
            MirrorRequest::Shutdown => {}
        }
    }

    #[instrument(skip(self, draft))]
    async fn handle_create(&mut self, draft: R::Draft) -> Result<R, FrameworkError> {
        debug!("Processing create request");
        let attempts = self.settings.id_attempts;
        for attempt in 1..=attempts {
            let id = (self.next_id_fn)();
            if self.is_known(&id) {
                debug!(%id, attempt, "Generated id already mirrored; regenerating");
                continue;
            }
            let row = R::from_draft(id, draft.clone()).map_err(FrameworkError::Invalid)?;
            match self.remote.insert(row).await {
                Ok(stored) => {
                    info!(id = %stored.id(), "Row created");
                    self.apply_local(stored.clone());
                    return Ok(stored);
                }
                Err(StoreError::Conflict(id)) => {
                    warn!(%id, attempt, "Remote reported duplicate id; regenerating");
                }
                Err(e) => {
                    error!(error = %e, "Insert rejected");
                    return Err(e.into());
                }
            }
        }
        error!(attempts, "Gave up generating an unused id");
        Err(FrameworkError::IdSpaceExhausted(attempts))
    }

    #[instrument(skip(self), fields(id = %id, status = %status))]
    async fn handle_set_status(&mut self, id: String, status: R::Status) -> Result<R, FrameworkError> {
        debug!("Processing status update");
        match self.remote.update_status(&id, status).await {
            Ok(updated) => {
                info!("Status updated");
                self.apply_local(updated.clone());
                Ok(updated)
            }
            Err(e) => {
                error!(error = %e, "Status update rejected");
                Err(e.into())
            }
        }
    }

    /// Replaces the rows with a full read. A failure keeps the old rows and
    /// records the error on the snapshot.
    async fn reload(&mut self) -> Result<usize, StoreError> {
        self.snapshot.send_modify(|snapshot| snapshot.loading = true);
        match self.remote.fetch_all().await {
            Ok(mut rows) => {
                rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
                let count = rows.len();
                self.snapshot.send_modify(|snapshot| {
                    snapshot.rows = Arc::new(rows);
                    snapshot.loading = false;
                    snapshot.error = None;
                });
                debug!(row_count = count, "Mirror refreshed");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed; keeping previous rows");
                self.snapshot.send_modify(|snapshot| {
                    snapshot.loading = false;
                    snapshot.error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    fn is_known(&self, id: &str) -> bool {
        self.snapshot.borrow().rows.iter().any(|row| row.id() == id)
    }

    fn apply_local(&mut self, row: R) {
        self.snapshot.send_modify(|snapshot| {
            let mut rows: Vec<R> = snapshot.rows.as_ref().clone();
            match rows.iter_mut().find(|existing| existing.id() == row.id()) {
                Some(existing) => *existing = row,
                None => rows.push(row),
            }
            rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
            snapshot.rows = Arc::new(rows);
        });
    }
}

// =============================================================================
// 4. THE CLIENT
// =============================================================================

/// Handle to a [`MirrorActor`]. Reads are synchronous against the latest
/// snapshot; writes round-trip through the actor.
#[derive(Clone)]
pub struct MirrorClient<R: Record> {
    sender: mpsc::Sender<MirrorRequest<R>>,
    snapshot: watch::Receiver<Snapshot<R>>,
}

impl<R: Record> MirrorClient<R> {
    pub fn new(sender: mpsc::Sender<MirrorRequest<R>>, snapshot: watch::Receiver<Snapshot<R>>) -> Self {
        Self { sender, snapshot }
    }

    pub async fn create(&self, draft: R::Draft) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(MirrorRequest::Create { draft, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn set_status(&self, id: String, status: R::Status) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(MirrorRequest::SetStatus { id, status, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn refetch(&self) -> Result<usize, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(MirrorRequest::Refetch { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn shutdown(&self) -> Result<(), FrameworkError> {
        self.sender
            .send(MirrorRequest::Shutdown)
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }

    pub fn snapshot(&self) -> Snapshot<R> {
        self.snapshot.borrow().clone()
    }

    pub fn rows(&self) -> Arc<Vec<R>> {
        Arc::clone(&self.snapshot.borrow().rows)
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.snapshot.borrow().rows.iter().find(|row| row.id() == id).cloned()
    }

    /// Waits until `ready` holds for the current snapshot.
    pub async fn wait_until(&self, ready: impl FnMut(&Snapshot<R>) -> bool) -> Result<Snapshot<R>, FrameworkError> {
        let mut receiver = self.snapshot.clone();
        let snapshot = receiver
            .wait_for(ready)
            .await
            .map_err(|_| FrameworkError::ActorDropped)?;
        Ok(snapshot.clone())
    }

    /// Waits for the first fetch to finish, successfully or not.
    pub async fn loaded(&self) -> Result<Snapshot<R>, FrameworkError> {
        self.wait_until(|snapshot| !snapshot.loading).await
    }
}

// =============================================================================
// 5. TESTS
// =============================================================================
