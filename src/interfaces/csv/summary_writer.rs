use crate::domain::money::Money;
use crate::domain::order::{Order, OrderStatus};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// One line of the end-of-run summary.
#[derive(Debug, Serialize, PartialEq)]
pub struct OrderSummary {
    pub order: u64,
    pub destination: String,
    pub status: OrderStatus,
    pub items: u32,
    pub owed: Money,
    pub paid: Money,
    pub remaining: Money,
    pub justification: Option<String>,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        let owed = order.amount_owed();
        let paid = order.amount_paid();
        Self {
            order: order.number,
            destination: order.destination.to_string(),
            status: order.status,
            items: order.items.iter().map(|i| i.quantity).sum(),
            owed,
            paid,
            remaining: owed - paid,
            justification: order.closure.as_ref().and_then(|c| c.justification.clone()),
        }
    }
}

/// Writes order summaries as CSV.
pub struct SummaryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders<'a>(&mut self, orders: impl IntoIterator<Item = &'a Order>) -> Result<()> {
        for order in orders {
            self.writer.serialize(OrderSummary::from(order))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
