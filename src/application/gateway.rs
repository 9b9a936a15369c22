use super::orders::OrderBook;
use crate::domain::draft::OrderDraft;
use crate::domain::order::{Destination, Order, OrderId, OrderItem};
use crate::domain::state::{Action, transition};
use crate::error::{ComandaError, Result};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPath {
    Created,
    Appended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub order: OrderId,
    pub path: SubmissionPath,
}

/// Routes new items either onto the open order of a table or into a new
/// order. Exactly one of the two happens per submission.
///
/// Two waiters may submit for the same free table at once and both create
/// an order; the gateway does not block that. Both orders are recorded and
/// both show up under the table.
#[derive(Clone)]
pub struct SubmissionGateway {
    book: OrderBook,
}

impl SubmissionGateway {
    pub fn new(book: OrderBook) -> Self {
        Self { book }
    }

    pub async fn submit(&self, items: Vec<OrderItem>, destination: Destination) -> Result<Submission> {
        if let Some(existing) = self.open_order_for(&destination).await? {
            match self.book.append_items(&existing, items.clone()).await {
                Ok(_) => {
                    return Ok(Submission {
                        order: existing,
                        path: SubmissionPath::Appended,
                    });
                }
                // Closed between the lookup and the append: nothing was
                // written, fall through and open a new order.
                Err(ComandaError::InvalidTransition { .. }) => {
                    warn!(order = %existing, %destination, "Table order closed before append, creating new order");
                }
                Err(e) => return Err(e),
            }
        }

        let order = self.book.create(&destination, items).await?;
        info!(%order, %destination, "Submitted as new order");
        Ok(Submission {
            order,
            path: SubmissionPath::Created,
        })
    }

    pub async fn submit_draft(&self, draft: OrderDraft) -> Result<Submission> {
        let (items, destination) = draft.into_parts()?;
        self.submit(items, destination).await
    }

    /// Oldest order that still accepts items on any requested table.
    async fn open_order_for(&self, destination: &Destination) -> Result<Option<OrderId>> {
        let Some(tables) = destination.tables() else {
            return Ok(None);
        };
        let snapshot = self.book.snapshot().await?;
        let mut candidates: Vec<&Order> = snapshot
            .orders
            .iter()
            .filter(|o| transition(o.status, Action::Reopen).is_some())
            .filter(|o| tables.iter().any(|t| o.destination.includes_table(*t)))
            .collect();
        candidates.sort_by_key(|o| (o.created_at, o.number));
        Ok(candidates.first().map(|o| o.id.clone()))
    }
}
