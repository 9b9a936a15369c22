//! Pure order model: data types, status transitions, derived floor views and
//! bill arithmetic, plus the port the persistence layer implements.

pub mod billing;
pub mod draft;
pub mod money;
pub mod order;
pub mod ports;
pub mod record;
pub mod state;
pub mod views;
