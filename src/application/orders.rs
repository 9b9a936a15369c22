use super::feed::FloorFeed;
use crate::config::EngineConfig;
use crate::domain::billing::Bill;
use crate::domain::order::{
    Closure, Destination, Order, OrderId, OrderItem, OrderStatus, SplitPayment,
};
use crate::domain::ports::{SharedOrderStore, VersionedUpdate};
use crate::domain::record::{FieldUpdate, OrderRecord, decode};
use crate::domain::state::{Action, transition};
use crate::domain::views::Snapshot;
use crate::error::{ComandaError, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Typed access to the order store.
///
/// Every mutation is a read-modify-write of specific fields guarded by the
/// record version. A write that loses the race to another device is retried
/// against the fresh record, so concurrent appends never drop each other.
#[derive(Clone)]
pub struct OrderBook {
    store: SharedOrderStore,
    config: EngineConfig,
}

impl OrderBook {
    pub fn new(store: SharedOrderStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Persists a new order in `PREPARING` and returns its durable id.
    pub async fn create(&self, destination: &Destination, items: Vec<OrderItem>) -> Result<OrderId> {
        validate_items(&items)?;
        let record = OrderRecord::new(Utc::now(), destination, items);
        let document = self.store.insert(record.to_value()?).await?;
        info!(order = %document.id, %destination, items = record.items.len(), "Order created");
        Ok(document.id)
    }

    pub async fn get(&self, id: &OrderId) -> Result<Order> {
        let document = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| ComandaError::OrderNotFound(id.clone()))?;
        decode(&document)
    }

    /// Appends items and reopens the order for the kitchen.
    pub async fn append_items(&self, id: &OrderId, items: Vec<OrderItem>) -> Result<Order> {
        validate_items(&items)?;
        let order = self
            .mutate(id, |order| {
                let status = next_status(order, Action::Reopen)?;
                let mut merged = order.items.clone();
                merged.extend(items.iter().cloned());
                Ok(Some(FieldUpdate::new().items(&merged)?.status(status)?))
            })
            .await?;
        info!(order = %id, added = items.len(), total = order.items.len(), "Items appended");
        Ok(order)
    }

    /// Applies a status-only action. Repeating an action already applied
    /// leaves the record untouched.
    pub async fn set_status(&self, id: &OrderId, action: Action) -> Result<Order> {
        let order = self
            .mutate(id, |order| {
                let status = next_status(order, action)?;
                if status == order.status {
                    return Ok(None);
                }
                Ok(Some(FieldUpdate::new().status(status)?))
            })
            .await?;
        info!(order = %id, status = %order.status, %action, "Status set");
        Ok(order)
    }

    pub async fn mark_ready(&self, id: &OrderId) -> Result<Order> {
        self.set_status(id, Action::MarkReady).await
    }

    pub async fn deliver(&self, id: &OrderId) -> Result<Order> {
        self.set_status(id, Action::Deliver).await
    }

    pub async fn mark_cleaned(&self, id: &OrderId) -> Result<Order> {
        self.set_status(id, Action::MarkCleaned).await
    }

    /// Adds payment fragments on top of whatever is already recorded.
    pub async fn append_payments(&self, id: &OrderId, payments: Vec<SplitPayment>) -> Result<Order> {
        if payments.is_empty() {
            return self.get(id).await;
        }
        let order = self
            .mutate(id, |order| {
                if !order.is_active() {
                    return Err(ComandaError::Validation(format!(
                        "Order {} is finished and takes no payments",
                        order.id
                    )));
                }
                let mut merged = order.payments.clone();
                merged.extend(payments.iter().copied());
                Ok(Some(FieldUpdate::new().payments(&merged)?))
            })
            .await?;
        info!(order = %id, added = payments.len(), paid = %order.amount_paid(), "Payments appended");
        Ok(order)
    }

    /// Closes every order of `bill` in one all-or-nothing write.
    ///
    /// Each order is re-read and must still owe and have paid what the bill
    /// was planned from; otherwise nothing is written and `BillChanged` is
    /// returned so the bill can be reviewed. A write that loses a race on a
    /// change that leaves the totals alone (a status update elsewhere) is
    /// retried.
    pub(crate) async fn close_bill(&self, bill: &Bill, closure: &Closure) -> Result<Vec<Order>> {
        let mut attempt = 0;
        loop {
            let mut writes = Vec::with_capacity(bill.orders.len());
            for planned in &bill.orders {
                let order = self.get(&planned.id).await?;
                if order.amount_owed() != planned.amount_owed()
                    || order.amount_paid() != planned.amount_paid()
                {
                    warn!(order = %order.id, bill = %bill.target, "Bill changed while closing");
                    return Err(ComandaError::BillChanged(bill.target.to_string()));
                }
                let await_cleaning =
                    self.config.cleaning_step && order.destination.tables().is_some();
                let status = next_status(&order, Action::CloseBill { await_cleaning })?;
                writes.push(VersionedUpdate {
                    id: order.id.clone(),
                    expected_version: order.version,
                    update: FieldUpdate::new().status(status)?.closure(closure)?,
                });
            }

            match self.store.update_many(&writes).await {
                Ok(documents) => {
                    let closed = documents.iter().map(decode).collect::<Result<Vec<_>>>()?;
                    for order in &closed {
                        info!(order = %order.id, status = %order.status, shortfall = %closure.shortfall, "Order closed");
                    }
                    return Ok(closed);
                }
                Err(ComandaError::VersionConflict { id, actual, .. })
                    if attempt < self.config.max_conflict_retries =>
                {
                    attempt += 1;
                    debug!(order = %id, attempt, version = actual, "Version conflict while closing, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Decoded active orders; malformed records are left out.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let documents = self.store.active().await?;
        Ok(Snapshot::decode(&documents))
    }

    /// Every decodable order, finished ones included.
    pub async fn all_orders(&self) -> Result<Vec<Order>> {
        let documents = self.store.all().await?;
        let mut orders = Vec::with_capacity(documents.len());
        for document in &documents {
            match decode(document) {
                Ok(order) => orders.push(order),
                Err(e) => warn!(order = %document.id, error = %e, "Skipping malformed record"),
            }
        }
        orders.sort_by_key(|o| (o.created_at, o.number));
        Ok(orders)
    }

    /// Subscribes to floor views. The first view reflects the current state.
    pub async fn feed(&self) -> Result<FloorFeed> {
        let receiver = self.store.subscribe();
        let current = self.store.active().await?;
        Ok(FloorFeed::new(receiver, current))
    }

    async fn mutate<F>(&self, id: &OrderId, change: F) -> Result<Order>
    where
        F: Fn(&Order) -> Result<Option<FieldUpdate>> + Send + Sync,
    {
        let mut attempt = 0;
        loop {
            let order = self.get(id).await?;
            let Some(update) = change(&order)? else {
                return Ok(order);
            };
            match self.store.update(id, order.version, &update).await {
                Ok(document) => return decode(&document),
                Err(ComandaError::VersionConflict { actual, .. })
                    if attempt < self.config.max_conflict_retries =>
                {
                    attempt += 1;
                    debug!(order = %id, attempt, version = actual, "Version conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn next_status(order: &Order, action: Action) -> Result<OrderStatus> {
    transition(order.status, action).ok_or_else(|| {
        warn!(order = %order.id, status = %order.status, %action, "Rejected transition");
        ComandaError::InvalidTransition {
            id: order.id.clone(),
            from: order.status,
            action,
        }
    })
}

fn validate_items(items: &[OrderItem]) -> Result<()> {
    if items.is_empty() {
        return Err(ComandaError::Validation(
            "At least one item is required".to_string(),
        ));
    }
    items.iter().try_for_each(OrderItem::validate)
}
