use super::billing::BillingDesk;
use super::feed::FloorFeed;
use super::gateway::SubmissionGateway;
use super::orders::OrderBook;
use crate::config::EngineConfig;
use crate::domain::ports::SharedOrderStore;
use crate::error::Result;

/// The main entry point for one staff device.
///
/// `FloorEngine` wires the order book, the submission gateway and the
/// billing desk around a shared store. Several engines over the same store
/// behave like several devices on the same backend.
#[derive(Clone)]
pub struct FloorEngine {
    orders: OrderBook,
    gateway: SubmissionGateway,
    billing: BillingDesk,
}

impl FloorEngine {
    /// Creates a new `FloorEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The order store shared with other devices.
    /// * `config` - Retry and closure tunables.
    pub fn new(store: SharedOrderStore, config: EngineConfig) -> Self {
        let orders = OrderBook::new(store, config);
        Self {
            gateway: SubmissionGateway::new(orders.clone()),
            billing: BillingDesk::new(orders.clone()),
            orders,
        }
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    pub fn gateway(&self) -> &SubmissionGateway {
        &self.gateway
    }

    pub fn billing(&self) -> &BillingDesk {
        &self.billing
    }

    pub async fn feed(&self) -> Result<FloorFeed> {
        self.orders.feed().await
    }
}
