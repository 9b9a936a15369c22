use super::order::OrderId;
use super::record::FieldUpdate;
use crate::error::{ComandaError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

/// One stored order record together with its revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: OrderId,
    pub version: u64,
    pub body: Value,
}

/// One guarded write within [`OrderStore::update_many`].
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedUpdate {
    pub id: OrderId,
    pub expected_version: u64,
    pub update: FieldUpdate,
}

impl VersionedUpdate {
    /// The next revision of `current`, or the reason it cannot be written.
    pub fn apply(&self, current: Option<&Document>) -> Result<Document> {
        let current = current.ok_or_else(|| ComandaError::OrderNotFound(self.id.clone()))?;
        if current.version != self.expected_version {
            return Err(ComandaError::VersionConflict {
                id: self.id.clone(),
                expected: self.expected_version,
                actual: current.version,
            });
        }
        let mut next = current.clone();
        self.update.apply_to(&mut next.body)?;
        next.version += 1;
        Ok(next)
    }
}

/// Full set of active records pushed to subscribers after every change.
pub type DocumentSnapshot = Arc<Vec<Document>>;

/// The persistence collaborator holding the authoritative order records.
///
/// Implementations must apply [`OrderStore::update`] atomically: the
/// version check and the field writes happen as one step, and the version
/// increases by one on success.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new record at version 1 and assigns its durable id.
    async fn insert(&self, body: Value) -> Result<Document>;
    async fn get(&self, id: &OrderId) -> Result<Option<Document>>;
    /// Writes `update` if the record is still at `expected_version`,
    /// failing with `VersionConflict` otherwise.
    async fn update(
        &self,
        id: &OrderId,
        expected_version: u64,
        update: &FieldUpdate,
    ) -> Result<Document>;
    /// Applies every update or none of them. Each record must still be at
    /// its expected version; the first mismatch fails the whole batch with
    /// `VersionConflict`. Ids within one batch must be distinct.
    async fn update_many(&self, updates: &[VersionedUpdate]) -> Result<Vec<Document>>;
    /// Records whose status is not terminal.
    async fn active(&self) -> Result<Vec<Document>>;
    async fn all(&self) -> Result<Vec<Document>>;
    /// Receives the active set after each successful mutation.
    fn subscribe(&self) -> broadcast::Receiver<DocumentSnapshot>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type SharedOrderStore = Arc<dyn OrderStore>;
