//! Order lifecycle and table reconciliation for a restaurant floor.
//!
//! Waiters submit orders, the kitchen and counter move them through their
//! statuses, and the billing desk reconciles payments per table before a
//! bill closes. Several devices share one order store; each sees the floor
//! through full snapshots pushed after every change.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod telemetry;
