//! Bill arithmetic for a table or a takeaway order.
//!
//! All amounts are integer cents, so "fully paid" means the remaining amount
//! is zero or negative. No tolerance is involved.

use super::money::Money;
use super::order::{Closure, Order, OrderId, OrderItem, OrderStatus, SplitPayment, TableNumber};
use crate::error::{ComandaError, Result};
use chrono::{DateTime, Utc};
use std::fmt;

/// Whose bill is being settled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BillTarget {
    Table(TableNumber),
    Takeaway(OrderId),
}

impl BillTarget {
    /// Picks the orders this bill covers out of an active set. Orders whose
    /// bill already closed (awaiting cleaning) are not billed twice.
    pub fn select(&self, orders: &[Order]) -> Vec<Order> {
        let mut selected: Vec<Order> = orders
            .iter()
            .filter(|o| o.is_active() && o.closure.is_none())
            .filter(|o| match self {
                BillTarget::Table(table) => o.destination.includes_table(*table),
                BillTarget::Takeaway(id) => &o.id == id && o.destination.client_name().is_some(),
            })
            .cloned()
            .collect();
        selected.sort_by_key(|o| (o.created_at, o.number));
        selected
    }
}

impl fmt::Display for BillTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillTarget::Table(table) => write!(f, "table {table}"),
            BillTarget::Takeaway(id) => write!(f, "takeaway order {id}"),
        }
    }
}

pub fn amount_owed(orders: &[Order]) -> Money {
    orders
        .iter()
        .flat_map(|o| o.items.iter())
        .map(OrderItem::line_total)
        .sum()
}

pub fn amount_paid(orders: &[Order]) -> Money {
    orders.iter().map(Order::amount_paid).sum()
}

/// A bill at one point in time: the orders it covers and their totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    pub target: BillTarget,
    pub orders: Vec<Order>,
}

impl Bill {
    pub fn new(target: BillTarget, active: &[Order]) -> Self {
        let orders = target.select(active);
        Self { target, orders }
    }

    pub fn amount_owed(&self) -> Money {
        amount_owed(&self.orders)
    }

    pub fn amount_paid(&self) -> Money {
        amount_paid(&self.orders)
    }

    pub fn remaining(&self) -> Money {
        self.amount_owed() - self.amount_paid()
    }

    pub fn is_fully_paid(&self) -> bool {
        self.remaining() <= Money::ZERO
    }

    /// A bill closes only once at least one of its orders was delivered.
    pub fn can_close(&self) -> bool {
        self.orders
            .iter()
            .any(|o| o.status == OrderStatus::Delivered)
    }

    /// The order new payment fragments are recorded on: the oldest one.
    pub fn payment_anchor(&self) -> Option<&Order> {
        self.orders.first()
    }

    /// Checks the closure preconditions and builds the audit record written
    /// to every order of the bill.
    ///
    /// A shortfall is accepted only with a non-blank justification.
    pub fn plan_closure(&self, justification: Option<&str>, now: DateTime<Utc>) -> Result<Closure> {
        if self.orders.is_empty() {
            return Err(ComandaError::NoActiveOrders(self.target.to_string()));
        }
        if !self.can_close() {
            return Err(ComandaError::NothingDelivered);
        }

        let justification = justification
            .map(str::trim)
            .filter(|j| !j.is_empty())
            .map(str::to_string);
        let remaining = self.remaining();
        if remaining > Money::ZERO && justification.is_none() {
            return Err(ComandaError::JustificationRequired { remaining });
        }

        Ok(Closure {
            closed_at: now,
            justification: if remaining > Money::ZERO {
                justification
            } else {
                None
            },
            shortfall: remaining.max(Money::ZERO),
        })
    }
}

/// Payment fragments gathered at the table before they are committed.
///
/// Committing appends the fragments to what is already persisted; nothing
/// previously paid is ever replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSession {
    bill: Bill,
    fragments: Vec<SplitPayment>,
}

impl PaymentSession {
    pub fn new(bill: Bill) -> Self {
        Self {
            bill,
            fragments: Vec::new(),
        }
    }

    pub fn add(&mut self, payment: SplitPayment) {
        self.fragments.push(payment);
    }

    /// Drops the most recent fragment that has not been committed yet.
    pub fn undo(&mut self) -> Option<SplitPayment> {
        self.fragments.pop()
    }

    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    pub fn fragments(&self) -> &[SplitPayment] {
        &self.fragments
    }

    pub fn session_total(&self) -> Money {
        self.fragments.iter().map(|p| p.amount.value()).sum()
    }

    /// What is still owed if the session were committed now.
    pub fn remaining(&self) -> Money {
        self.bill.remaining() - self.session_total()
    }

    pub fn into_parts(self) -> (Bill, Vec<SplitPayment>) {
        (self.bill, self.fragments)
    }
}
