use crate::domain::order::OrderId;
use crate::domain::ports::{Document, DocumentSnapshot, OrderStore, VersionedUpdate};
use crate::domain::record::{FieldUpdate, is_active_record};
use crate::error::{ComandaError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, broadcast};

/// A thread-safe in-memory order store.
///
/// Uses `Arc<RwLock<HashMap<OrderId, Document>>>` so every clone shares the
/// same records; each clone stands in for one staff device talking to the
/// same backend. Version checks run under the write lock, which makes
/// [`OrderStore::update`] atomic.
#[derive(Clone)]
pub struct InMemoryOrderStore {
    documents: Arc<RwLock<HashMap<OrderId, Document>>>,
    snapshots: broadcast::Sender<DocumentSnapshot>,
    reachable: Arc<AtomicBool>,
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose subscribers buffer up to `capacity` pushes.
    pub fn with_capacity(capacity: usize) -> Self {
        let (snapshots, _) = broadcast::channel(capacity.max(1));
        Self {
            documents: Arc::default(),
            snapshots,
            reachable: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulates losing (or regaining) the connection to the backend.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    fn ensure_reachable(&self) -> Result<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ComandaError::PersistenceUnavailable(
                "in-memory store marked unreachable".to_string(),
            ))
        }
    }

    fn active_set(documents: &HashMap<OrderId, Document>) -> Vec<Document> {
        let mut active: Vec<Document> = documents
            .values()
            .filter(|d| is_active_record(&d.body))
            .cloned()
            .collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));
        active
    }

    /// Pushes the active set. Called with the write lock held so pushes leave
    /// in the same order the writes were applied.
    fn publish(&self, documents: &HashMap<OrderId, Document>) {
        // No subscribers is fine.
        let _ = self.snapshots.send(Arc::new(Self::active_set(documents)));
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, body: Value) -> Result<Document> {
        self.ensure_reachable()?;
        let document = Document {
            id: OrderId::generate(),
            version: 1,
            body,
        };
        let mut documents = self.documents.write().await;
        documents.insert(document.id.clone(), document.clone());
        self.publish(&documents);
        Ok(document)
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Document>> {
        self.ensure_reachable()?;
        let documents = self.documents.read().await;
        Ok(documents.get(id).cloned())
    }

    async fn update(
        &self,
        id: &OrderId,
        expected_version: u64,
        update: &FieldUpdate,
    ) -> Result<Document> {
        self.ensure_reachable()?;
        let write = VersionedUpdate {
            id: id.clone(),
            expected_version,
            update: update.clone(),
        };
        let mut documents = self.documents.write().await;
        let updated = write.apply(documents.get(id))?;
        documents.insert(updated.id.clone(), updated.clone());
        self.publish(&documents);
        Ok(updated)
    }

    async fn update_many(&self, updates: &[VersionedUpdate]) -> Result<Vec<Document>> {
        self.ensure_reachable()?;
        let mut documents = self.documents.write().await;
        // Stage everything first so a conflict anywhere writes nothing.
        let staged = updates
            .iter()
            .map(|write| write.apply(documents.get(&write.id)))
            .collect::<Result<Vec<_>>>()?;
        for document in &staged {
            documents.insert(document.id.clone(), document.clone());
        }
        self.publish(&documents);
        Ok(staged)
    }

    async fn active(&self) -> Result<Vec<Document>> {
        self.ensure_reachable()?;
        let documents = self.documents.read().await;
        Ok(Self::active_set(&documents))
    }

    async fn all(&self) -> Result<Vec<Document>> {
        self.ensure_reachable()?;
        let documents = self.documents.read().await;
        let mut all: Vec<Document> = documents.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentSnapshot> {
        self.snapshots.subscribe()
    }
}
