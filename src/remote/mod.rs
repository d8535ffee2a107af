//! The hosted table store, seen from this crate.
//!
//! Only four operations are used per table: a full newest-first read, a
//! single-row insert, a status update keyed by the public id, and a change
//! feed that fires on any insert/update/delete without saying what changed.

mod memory;

pub use memory::MemoryTable;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::mirror_framework::Record;

/// Errors reported by the remote store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Write rejected: {0}")]
    Rejected(String),
    #[error("No row matches id {0}")]
    NotFound(String),
    #[error("Duplicate key: {0}")]
    Conflict(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Notification that a table changed. Consumers re-fetch; `kind` is only
/// carried for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: &'static str,
    pub kind: ChangeKind,
}

#[async_trait]
pub trait RemoteTable<R: Record>: Send + Sync + 'static {
    /// Every row, newest `created_at` first.
    async fn fetch_all(&self) -> Result<Vec<R>, StoreError>;

    /// Inserts `row`, assigning `created_at`. Rejects a duplicate id with
    /// [`StoreError::Conflict`].
    async fn insert(&self, row: R) -> Result<R, StoreError>;

    /// Sets only the status column of the row whose id equals `id`.
    async fn update_status(&self, id: &str, status: R::Status) -> Result<R, StoreError>;

    /// Opens a change subscription. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
