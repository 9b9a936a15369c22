//! Edges of the system: floor scripts in, bill summaries out.

pub mod csv;
pub mod script;
