use super::orders::OrderBook;
use crate::domain::billing::{Bill, BillTarget, PaymentSession};
use crate::domain::money::Money;
use crate::domain::order::{Order, OrderStatus, SplitPayment, TableNumber};
use crate::error::{ComandaError, Result};
use chrono::Utc;
use tracing::info;

/// Outcome of a successful bill closure.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedBill {
    pub target: BillTarget,
    pub orders: Vec<Order>,
    pub shortfall: Money,
    pub justification: Option<String>,
}

/// Settles bills: reads what a target owes, records payments and closes.
#[derive(Clone)]
pub struct BillingDesk {
    book: OrderBook,
}

impl BillingDesk {
    pub fn new(book: OrderBook) -> Self {
        Self { book }
    }

    /// Current bill for `target`, computed from the active orders.
    pub async fn bill(&self, target: BillTarget) -> Result<Bill> {
        let snapshot = self.book.snapshot().await?;
        Ok(Bill::new(target, &snapshot.orders))
    }

    pub async fn open_session(&self, target: BillTarget) -> Result<PaymentSession> {
        let bill = self.bill(target).await?;
        if bill.orders.is_empty() {
            return Err(ComandaError::NoActiveOrders(bill.target.to_string()));
        }
        Ok(PaymentSession::new(bill))
    }

    /// Records the session's fragments next to the payments already stored.
    pub async fn commit(&self, session: PaymentSession) -> Result<Bill> {
        let (bill, fragments) = session.into_parts();
        let anchor = bill
            .payment_anchor()
            .ok_or_else(|| ComandaError::NoActiveOrders(bill.target.to_string()))?;
        self.book.append_payments(&anchor.id, fragments).await?;
        self.bill(bill.target).await
    }

    /// Opens a session, adds `payments` and commits it.
    pub async fn pay(&self, target: BillTarget, payments: Vec<SplitPayment>) -> Result<Bill> {
        let mut session = self.open_session(target).await?;
        for payment in payments {
            session.add(payment);
        }
        self.commit(session).await
    }

    /// Closes the bill of `target`.
    ///
    /// A fully paid bill closes without further input. A shortfall needs a
    /// non-blank `justification`, which is stored on every closed order.
    /// Either every order of the bill closes or none does.
    /// With the cleaning step enabled, dine-in orders wait in
    /// `NEEDS_CLEANING` instead of finishing.
    pub async fn close(&self, target: BillTarget, justification: Option<&str>) -> Result<ClosedBill> {
        let bill = self.bill(target).await?;
        let closure = bill.plan_closure(justification, Utc::now())?;
        let closed = self.book.close_bill(&bill, &closure).await?;
        info!(bill = %bill.target, orders = closed.len(), shortfall = %closure.shortfall, "Bill closed");

        Ok(ClosedBill {
            target: bill.target,
            orders: closed,
            shortfall: closure.shortfall,
            justification: closure.justification,
        })
    }

    /// Finishes every order on `table` that waits for cleaning.
    pub async fn mark_cleaned(&self, table: TableNumber) -> Result<Vec<Order>> {
        let snapshot = self.book.snapshot().await?;
        let waiting: Vec<&Order> = snapshot
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::NeedsCleaning && o.destination.includes_table(table))
            .collect();
        if waiting.is_empty() {
            return Err(ComandaError::NoActiveOrders(format!("table {table} awaiting cleaning")));
        }

        let mut cleaned = Vec::with_capacity(waiting.len());
        for order in waiting {
            cleaned.push(self.book.mark_cleaned(&order.id).await?);
        }
        info!(table, orders = cleaned.len(), "Table cleaned");
        Ok(cleaned)
    }
}
