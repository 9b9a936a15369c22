use crate::domain::order::OrderId;
use crate::domain::ports::{Document, DocumentSnapshot, OrderStore, VersionedUpdate};
use crate::domain::record::{FieldUpdate, is_active_record};
use crate::error::{ComandaError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tracing::warn;

/// Column Family for storing order records.
pub const CF_ORDERS: &str = "orders";

/// A persistent order store implementation using RocksDB.
///
/// Each record is kept as a JSON-encoded [`Document`] keyed by its id.
/// Writes are serialized through a single lock so the version check and the
/// put in [`OrderStore::update`] form one atomic step.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
    snapshots: broadcast::Sender<DocumentSnapshot>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "orders" column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    /// * `capacity` - Snapshot pushes buffered per subscriber.
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders])?;
        let (snapshots, _) = broadcast::channel(capacity.max(1));

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
            snapshots,
        })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(CF_ORDERS)
            .ok_or_else(|| ComandaError::Storage("Orders column family not found".to_string()))
    }

    fn read(&self, id: &OrderId) -> Result<Option<Document>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, document: &Document) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(document)?;
        self.db.put_cf(cf, document.id.as_str().as_bytes(), value)?;
        Ok(())
    }

    /// Every stored document. Entries that are not a valid envelope are
    /// skipped so one corrupt value cannot hide the others.
    fn scan(&self) -> Result<Vec<Document>> {
        let cf = self.cf()?;
        let mut documents = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            match serde_json::from_slice(&value) {
                Ok(document) => documents.push(document),
                Err(e) => warn!(
                    key = %String::from_utf8_lossy(&key),
                    error = %e,
                    "Skipping undecodable stored record"
                ),
            }
        }
        Ok(documents)
    }

    fn scan_active(&self) -> Result<Vec<Document>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|d| is_active_record(&d.body))
            .collect())
    }

    /// Pushes the active set. Runs after a committed write, so a failed
    /// scan is logged rather than reported as a failed mutation.
    fn publish(&self) {
        match self.scan_active() {
            Ok(active) => {
                let _ = self.snapshots.send(Arc::new(active));
            }
            Err(e) => warn!(error = %e, "Could not push snapshot after write"),
        }
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn insert(&self, body: Value) -> Result<Document> {
        let _guard = self.write_lock.lock().await;
        let document = Document {
            id: OrderId::generate(),
            version: 1,
            body,
        };
        self.write(&document)?;
        self.publish();
        Ok(document)
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Document>> {
        self.read(id)
    }

    async fn update(
        &self,
        id: &OrderId,
        expected_version: u64,
        update: &FieldUpdate,
    ) -> Result<Document> {
        let write = VersionedUpdate {
            id: id.clone(),
            expected_version,
            update: update.clone(),
        };
        let _guard = self.write_lock.lock().await;
        let document = write.apply(self.read(id)?.as_ref())?;
        self.write(&document)?;
        self.publish();
        Ok(document)
    }

    async fn update_many(&self, updates: &[VersionedUpdate]) -> Result<Vec<Document>> {
        let _guard = self.write_lock.lock().await;
        let staged = updates
            .iter()
            .map(|write| write.apply(self.read(&write.id)?.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let cf = self.cf()?;
        let mut batch = WriteBatch::default();
        for document in &staged {
            batch.put_cf(cf, document.id.as_str().as_bytes(), serde_json::to_vec(document)?);
        }
        self.db.write(batch)?;
        self.publish();
        Ok(staged)
    }

    async fn active(&self) -> Result<Vec<Document>> {
        self.scan_active()
    }

    async fn all(&self) -> Result<Vec<Document>> {
        self.scan()
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentSnapshot> {
        self.snapshots.subscribe()
    }
}
