//! Order status transitions.
//!
//! ```text
//! PREPARING --mark ready--> READY --deliver--> DELIVERED
//!     ^                                            |
//!     +--------- reopen (items appended) ----------+
//!
//! open --close bill--> FINISHED, or NEEDS_CLEANING --mark cleaned--> FINISHED
//! ```
//!
//! Reopening is an explicit transition fired by an item append: the table
//! ordered more, so the kitchen has work again. An order whose bill is
//! closed but whose table still awaits cleaning can no longer be reopened.

use super::order::OrderStatus;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Kitchen finished preparing.
    MarkReady,
    /// Counter handed the order over.
    Deliver,
    /// Items were appended to the order.
    Reopen,
    /// Bill closure. `await_cleaning` parks dine-in orders in `NEEDS_CLEANING`.
    CloseBill { await_cleaning: bool },
    /// The table was cleaned after its bill closed.
    MarkCleaned,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::MarkReady => "mark ready",
            Action::Deliver => "deliver",
            Action::Reopen => "reopen",
            Action::CloseBill { .. } => "close the bill",
            Action::MarkCleaned => "mark cleaned",
        };
        f.write_str(name)
    }
}

/// Returns the status `action` leads to from `from`, or `None` when the
/// transition is not permitted.
///
/// Repeating a status-setting action on an order already in the target
/// status is permitted and yields the same status.
pub fn transition(from: OrderStatus, action: Action) -> Option<OrderStatus> {
    use crate::domain::order::OrderStatus::*;

    if from.is_terminal() {
        return None;
    }
    match (from, action) {
        (Preparing | Ready, Action::MarkReady) => Some(Ready),
        (Ready | Delivered, Action::Deliver) => Some(Delivered),
        (NeedsCleaning, Action::Reopen | Action::CloseBill { .. }) => None,
        (_, Action::Reopen) => Some(Preparing),
        (_, Action::CloseBill { await_cleaning: true }) => Some(NeedsCleaning),
        (_, Action::CloseBill { await_cleaning: false }) => Some(Finished),
        (NeedsCleaning, Action::MarkCleaned) => Some(Finished),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus::*;

    #[test]
    fn test_happy_path() {
        assert_eq!(transition(Preparing, Action::MarkReady), Some(Ready));
        assert_eq!(transition(Ready, Action::Deliver), Some(Delivered));
        assert_eq!(
            transition(Delivered, Action::CloseBill { await_cleaning: false }),
            Some(Finished)
        );
    }

    #[test]
    fn test_cleaning_path() {
        assert_eq!(
            transition(Delivered, Action::CloseBill { await_cleaning: true }),
            Some(NeedsCleaning)
        );
        assert_eq!(transition(NeedsCleaning, Action::MarkCleaned), Some(Finished));
        assert_eq!(
            transition(NeedsCleaning, Action::CloseBill { await_cleaning: false }),
            None
        );
    }

    #[test]
    fn test_repeated_actions_are_idempotent() {
        assert_eq!(transition(Ready, Action::MarkReady), Some(Ready));
        assert_eq!(transition(Delivered, Action::Deliver), Some(Delivered));
    }

    #[test]
    fn test_out_of_order_actions_rejected() {
        assert_eq!(transition(Preparing, Action::Deliver), None);
        assert_eq!(transition(Delivered, Action::MarkReady), None);
        assert_eq!(transition(Ready, Action::MarkCleaned), None);
    }

    #[test]
    fn test_reopen_from_every_open_status() {
        for from in [Preparing, Ready, Delivered] {
            assert_eq!(transition(from, Action::Reopen), Some(Preparing));
        }
        assert_eq!(transition(NeedsCleaning, Action::Reopen), None);
    }

    #[test]
    fn test_finished_is_terminal() {
        for action in [
            Action::MarkReady,
            Action::Deliver,
            Action::Reopen,
            Action::CloseBill { await_cleaning: false },
            Action::MarkCleaned,
        ] {
            assert_eq!(transition(Finished, action), None);
        }
    }
}
