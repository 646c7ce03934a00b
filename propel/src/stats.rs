//! Solver statistics.

/// Counters kept during search.
#[derive(Default)]
pub struct Stats {
    /// Total number of literal assignments performed so far, including speculative trials.
    pub propagations: u64,
    /// Total number of decisions made so far, including retried alternatives.
    pub choices: u64,
}
