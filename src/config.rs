/// Tunables for the order engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// How many times a mutation is retried after losing a version race.
    pub max_conflict_retries: u32,
    /// Park closed dine-in orders in `NEEDS_CLEANING` until the table is cleaned.
    pub cleaning_step: bool,
    /// Snapshot pushes buffered per subscriber before it starts skipping.
    pub feed_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 8,
            cleaning_step: false,
            feed_capacity: 64,
        }
    }
}
