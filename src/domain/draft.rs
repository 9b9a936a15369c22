use super::money::Money;
use super::order::{Destination, OrderItem};
use crate::error::{ComandaError, Result};

/// An order being assembled by a waiter before it is sent.
///
/// Until submission anything may change: items can be replaced wholesale
/// and the destination can be re-pointed. After submission the store only
/// accepts item appends.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    destination: Destination,
    items: Vec<OrderItem>,
}

impl OrderDraft {
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            items: Vec::new(),
        }
    }

    pub fn add(&mut self, item: OrderItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn remove(&mut self, index: usize) -> Option<OrderItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn replace_items(&mut self, items: Vec<OrderItem>) {
        self.items = items;
    }

    pub fn set_destination(&mut self, destination: Destination) {
        self.destination = destination;
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Hands the draft over for submission.
    pub fn into_parts(self) -> Result<(Vec<OrderItem>, Destination)> {
        if self.items.is_empty() {
            return Err(ComandaError::Validation(
                "Cannot send an order without items".to_string(),
            ));
        }
        Ok((self.items, self.destination))
    }
}
