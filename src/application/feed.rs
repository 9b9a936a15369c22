use crate::domain::ports::{Document, DocumentSnapshot};
use crate::domain::views::FloorView;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::debug;

/// A long-lived subscription turning store pushes into [`FloorView`]s.
///
/// Each push is treated as the whole truth: the view is rebuilt from it and
/// nothing from earlier pushes is merged in. A subscriber that falls behind
/// skips straight to the newest push. Dropping the feed ends the
/// subscription without affecting any mutation in flight.
pub struct FloorFeed {
    receiver: broadcast::Receiver<DocumentSnapshot>,
    pending: Option<DocumentSnapshot>,
}

impl FloorFeed {
    pub(crate) fn new(receiver: broadcast::Receiver<DocumentSnapshot>, current: Vec<Document>) -> Self {
        Self {
            receiver,
            pending: Some(Arc::new(current)),
        }
    }

    /// Waits for the next view. Returns `None` once the store goes away.
    pub async fn next(&mut self) -> Option<FloorView> {
        if let Some(documents) = self.pending.take() {
            return Some(FloorView::from_documents(&documents));
        }
        loop {
            match self.receiver.recv().await {
                Ok(documents) => {
                    let newest = self.drain().unwrap_or(documents);
                    return Some(FloorView::from_documents(&newest));
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Floor feed lagged, jumping to newest snapshot");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Newest push already queued, if any, discarding older ones.
    fn drain(&mut self) -> Option<DocumentSnapshot> {
        let mut newest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(documents) => newest = Some(documents),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return newest,
            }
        }
    }
}
