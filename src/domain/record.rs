//! Persisted shape of an order and its strict decoding.
//!
//! Stores hold each order as a JSON object. Required fields are `number`,
//! `created_at`, `status`, `destination` and `items`. Optional fields fall
//! back as follows:
//!
//! | field         | default  |
//! |---------------|----------|
//! | `tables`      | `[]`     |
//! | `client_name` | `null`   |
//! | `payments`    | `[]`     |
//! | `closure`     | `null`   |
//!
//! A record that fails to decode, or whose destination fields disagree with
//! its destination kind, is rejected on its own with
//! [`ComandaError::MalformedRecord`].

use super::order::{
    Closure, Destination, DestinationKind, Order, OrderItem, OrderStatus, SplitPayment, TableNumber,
};
use super::ports::Document;
use crate::error::{ComandaError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names, shared by targeted updates.
pub const FIELD_STATUS: &str = "status";
pub const FIELD_ITEMS: &str = "items";
pub const FIELD_PAYMENTS: &str = "payments";
pub const FIELD_CLOSURE: &str = "closure";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub destination: DestinationKind,
    #[serde(default)]
    pub tables: Vec<TableNumber>,
    #[serde(default)]
    pub client_name: Option<String>,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub payments: Vec<SplitPayment>,
    #[serde(default)]
    pub closure: Option<Closure>,
}

impl OrderRecord {
    /// A fresh record in the initial status.
    pub fn new(created_at: DateTime<Utc>, destination: &Destination, items: Vec<OrderItem>) -> Self {
        Self {
            number: created_at.timestamp_millis().max(0) as u64,
            created_at,
            status: OrderStatus::Preparing,
            destination: destination.kind(),
            tables: destination
                .tables()
                .map(|tables| tables.iter().copied().collect())
                .unwrap_or_default(),
            client_name: destination.client_name().map(str::to_string),
            items,
            payments: Vec::new(),
            closure: None,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn destination(&self) -> std::result::Result<Destination, String> {
        match self.destination {
            DestinationKind::DineIn => {
                if self.client_name.is_some() {
                    return Err("dine-in record carries a client name".to_string());
                }
                Destination::dine_in(self.tables.iter().copied()).map_err(|e| e.to_string())
            }
            DestinationKind::Takeaway => {
                if !self.tables.is_empty() {
                    return Err("takeaway record carries tables".to_string());
                }
                let name = self.client_name.clone().unwrap_or_default();
                Destination::takeaway(name).map_err(|e| e.to_string())
            }
        }
    }
}

/// Decodes one stored document into an [`Order`].
pub fn decode(document: &Document) -> Result<Order> {
    let malformed = |reason: String| ComandaError::MalformedRecord {
        id: document.id.to_string(),
        reason,
    };

    let record: OrderRecord =
        serde_json::from_value(document.body.clone()).map_err(|e| malformed(e.to_string()))?;
    let destination = record.destination().map_err(malformed)?;
    for item in &record.items {
        item.validate().map_err(|e| malformed(e.to_string()))?;
    }

    Ok(Order {
        id: document.id.clone(),
        version: document.version,
        number: record.number,
        created_at: record.created_at,
        status: record.status,
        destination,
        items: record.items,
        payments: record.payments,
        closure: record.closure,
    })
}

/// A set of field replacements applied to one stored record.
///
/// Only the named fields are written, so concurrent updates to different
/// fields of the same order never clobber each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    fields: Map<String, Value>,
}

impl FieldUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(self, status: OrderStatus) -> Result<Self> {
        self.set(FIELD_STATUS, &status)
    }

    pub fn items(self, items: &[OrderItem]) -> Result<Self> {
        self.set(FIELD_ITEMS, items)
    }

    pub fn payments(self, payments: &[SplitPayment]) -> Result<Self> {
        self.set(FIELD_PAYMENTS, payments)
    }

    pub fn closure(self, closure: &Closure) -> Result<Self> {
        self.set(FIELD_CLOSURE, closure)
    }

    fn set<T: Serialize + ?Sized>(mut self, field: &str, value: &T) -> Result<Self> {
        self.fields
            .insert(field.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Writes the fields into `body`, leaving every other field untouched.
    pub fn apply_to(&self, body: &mut Value) -> Result<()> {
        let object = body.as_object_mut().ok_or_else(|| ComandaError::MalformedRecord {
            id: String::new(),
            reason: "record body is not an object".to_string(),
        })?;
        for (field, value) in &self.fields {
            object.insert(field.clone(), value.clone());
        }
        Ok(())
    }
}

/// Whether a raw record is still active. Used to build snapshots without
/// decoding every record twice; unreadable statuses count as active so the
/// decoder gets to report them.
pub fn is_active_record(body: &Value) -> bool {
    body.get(FIELD_STATUS).and_then(Value::as_str) != Some(OrderStatus::Finished.as_str())
}
