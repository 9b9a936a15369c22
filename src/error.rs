use crate::domain::order::{OrderId, OrderStatus};
use crate::domain::money::Money;
use crate::domain::state::Action;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComandaError {
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),
    #[error("Version conflict on order {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: OrderId,
        expected: u64,
        actual: u64,
    },
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),
    #[error("Invalid transition for order {id}: cannot {action} while {from}")]
    InvalidTransition {
        id: OrderId,
        from: OrderStatus,
        action: Action,
    },
    #[error("Malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },
    #[error("Closing with {remaining} outstanding requires a justification")]
    JustificationRequired { remaining: Money },
    #[error("No order on this bill has been delivered yet")]
    NothingDelivered,
    #[error("Bill for {0} changed while closing; review it and try again")]
    BillChanged(String),
    #[error("No active orders for {0}")]
    NoActiveOrders(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for ComandaError {
    fn from(e: rocksdb::Error) -> Self {
        ComandaError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ComandaError>;
