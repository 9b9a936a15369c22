//! Application layer orchestrating the order lifecycle.
//!
//! [`engine::FloorEngine`] is the primary entry point. It bundles the
//! [`orders::OrderBook`] (typed, conflict-retrying store access), the
//! [`gateway::SubmissionGateway`], the [`billing::BillingDesk`] and the
//! [`feed::FloorFeed`] subscription.

pub mod billing;
pub mod engine;
pub mod feed;
pub mod gateway;
pub mod orders;
