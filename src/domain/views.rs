//! Read-only projections of the active order set.
//!
//! Every view is a pure function of a snapshot and is rebuilt from scratch
//! whenever a new snapshot arrives. Nothing here is patched in place.

use super::order::{Order, OrderStatus, TableNumber};
use super::ports::Document;
use super::record::decode;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// The decoded active orders of one store push.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub orders: Vec<Order>,
    /// Ids of records that failed to decode and were left out.
    pub dropped: Vec<String>,
}

impl Snapshot {
    /// Decodes each document on its own. Malformed records are dropped and
    /// logged; they never take the rest of the snapshot down with them.
    pub fn decode(documents: &[Document]) -> Self {
        let mut snapshot = Snapshot::default();
        for document in documents {
            match decode(document) {
                Ok(order) if order.is_active() => snapshot.orders.push(order),
                Ok(_) => {}
                Err(e) => {
                    warn!(order = %document.id, error = %e, "Dropping malformed record");
                    snapshot.dropped.push(document.id.to_string());
                }
            }
        }
        snapshot
    }
}

/// Orders the kitchen still has to prepare, oldest first.
pub fn kitchen_queue(orders: &[Order]) -> Vec<Order> {
    let mut queue: Vec<Order> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Preparing)
        .cloned()
        .collect();
    queue.sort_by_key(|o| (o.created_at, o.number));
    queue
}

/// Orders waiting at the counter, in snapshot order.
pub fn ready_queue(orders: &[Order]) -> Vec<Order> {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::Ready)
        .cloned()
        .collect()
}

/// Every table referenced by an active dine-in order.
pub fn occupied_tables(orders: &[Order]) -> BTreeSet<TableNumber> {
    orders
        .iter()
        .filter(|o| o.is_active())
        .filter_map(|o| o.destination.tables())
        .flatten()
        .copied()
        .collect()
}

/// Active dine-in orders grouped under each table they reference. An order
/// spanning several tables appears under each of them.
pub fn orders_by_table(orders: &[Order]) -> BTreeMap<TableNumber, Vec<Order>> {
    let mut grouped: BTreeMap<TableNumber, Vec<Order>> = BTreeMap::new();
    for order in orders.iter().filter(|o| o.is_active()) {
        for table in order.destination.tables().into_iter().flatten() {
            grouped.entry(*table).or_default().push(order.clone());
        }
    }
    for group in grouped.values_mut() {
        group.sort_by_key(|o| (o.created_at, o.number));
    }
    grouped
}

/// All four projections of one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorView {
    pub active: Vec<Order>,
    pub kitchen_queue: Vec<Order>,
    pub ready_queue: Vec<Order>,
    pub occupied_tables: BTreeSet<TableNumber>,
    pub orders_by_table: BTreeMap<TableNumber, Vec<Order>>,
    pub dropped: Vec<String>,
}

impl FloorView {
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let orders = snapshot.orders;
        Self {
            kitchen_queue: kitchen_queue(&orders),
            ready_queue: ready_queue(&orders),
            occupied_tables: occupied_tables(&orders),
            orders_by_table: orders_by_table(&orders),
            active: orders,
            dropped: snapshot.dropped,
        }
    }

    pub fn from_documents(documents: &[Document]) -> Self {
        Self::from_snapshot(Snapshot::decode(documents))
    }

    pub fn orders_for_table(&self, table: TableNumber) -> &[Order] {
        self.orders_by_table
            .get(&table)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_occupied(&self, table: TableNumber) -> bool {
        self.occupied_tables.contains(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::fixtures::order;
    use crate::domain::order::{Destination, OrderId};
    use crate::domain::record::OrderRecord;
    use serde_json::json;

    fn table(n: u32) -> Destination {
        Destination::dine_in([n]).unwrap()
    }

    fn sample() -> Vec<Order> {
        vec![
            order("late", 3_000, OrderStatus::Preparing, table(1)),
            order("early", 1_000, OrderStatus::Preparing, table(2)),
            order("ready", 2_000, OrderStatus::Ready, table(1)),
            order(
                "pair",
                4_000,
                OrderStatus::Delivered,
                Destination::dine_in([3, 4]).unwrap(),
            ),
            order(
                "takeaway",
                500,
                OrderStatus::Preparing,
                Destination::takeaway("Ana").unwrap(),
            ),
            order("done", 100, OrderStatus::Finished, table(9)),
        ]
    }

    fn ids(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_kitchen_queue_is_fifo() {
        let queue = kitchen_queue(&sample());
        assert_eq!(ids(&queue), vec!["takeaway", "early", "late"]);
        assert!(queue.iter().all(|o| o.status == OrderStatus::Preparing));
        assert!(queue.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn test_ready_queue() {
        assert_eq!(ids(&ready_queue(&sample())), vec!["ready"]);
    }

    #[test]
    fn test_occupied_tables_skip_terminal_and_takeaway() {
        let tables = occupied_tables(&sample());
        assert_eq!(tables, BTreeSet::from([1, 2, 3, 4]));
    }

    #[test]
    fn test_orders_by_table() {
        let grouped = orders_by_table(&sample());
        assert_eq!(ids(&grouped[&1]), vec!["ready", "late"]);
        assert_eq!(ids(&grouped[&3]), vec!["pair"]);
        assert_eq!(ids(&grouped[&4]), vec!["pair"]);
        assert!(!grouped.contains_key(&9));
    }

    #[test]
    fn test_empty_snapshot() {
        let view = FloorView::from_snapshot(Snapshot::default());
        assert!(view.kitchen_queue.is_empty());
        assert!(view.occupied_tables.is_empty());
        assert!(view.orders_for_table(1).is_empty());
    }

    #[test]
    fn test_malformed_record_is_dropped() {
        let good = OrderRecord::new(
            chrono::DateTime::from_timestamp_millis(1_000).unwrap(),
            &table(7),
            vec![crate::domain::order::fixtures::item("burger", 2500, 1)],
        );
        let documents = vec![
            Document {
                id: OrderId::new("good"),
                version: 1,
                body: good.to_value().unwrap(),
            },
            Document {
                id: OrderId::new("bad"),
                version: 1,
                body: json!({ "status": "PREPARING" }),
            },
        ];

        let view = FloorView::from_documents(&documents);
        assert_eq!(ids(&view.kitchen_queue), vec!["good"]);
        assert!(view.is_occupied(7));
        assert_eq!(view.dropped, vec!["bad".to_string()]);
    }
}
