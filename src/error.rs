//! Error taxonomy for the forecast engine.
//!
//! The boundary rule: malformed history is rejected here, at construction
//! time, and never reaches the weight model. Nothing in the core retries —
//! a validation failure means the upstream loader must be fixed, not that
//! the run should loop.
//!
//! Running out of history is *not* an error: the recency window degrades
//! gracefully to whatever series exist (including zero).

use thiserror::Error;

/// All failure conditions observable from the engine core.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An event failed validation: wrong size, duplicate number, or a
    /// number outside `[1, domain_size]`. Fatal to the record, not the run.
    #[error("invalid event: {reason}")]
    InvalidEvent { reason: String },

    /// A series did not contain exactly the required number of events.
    #[error("series {id}: expected {expected} events, got {got}")]
    InvalidSeries { id: u64, expected: usize, got: usize },

    /// Series ids must be strictly increasing — they are the only clock.
    #[error("series id {id} is not greater than preceding id {prev}")]
    OutOfOrderSeries { id: u64, prev: u64 },

    /// A configuration value outside its recognized range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No candidate could be produced. Reported as a configuration error
    /// (`pool_size = 0` and friends), never retried.
    #[error("no candidates produced; check pool_size and top_n")]
    EmptyResult,

    /// One ensemble seed failed. Isolated by the driver: siblings continue
    /// and aggregation excludes this seed.
    #[error("seed {seed} failed: {source}")]
    SeedFailure {
        seed: u64,
        #[source]
        source: Box<EngineError>,
    },

    /// Every seed failed; there is nothing to aggregate.
    #[error("all {0} ensemble seeds failed")]
    AllSeedsFailed(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_actionable() {
        let err = EngineError::InvalidSeries {
            id: 12,
            expected: 7,
            got: 6,
        };
        assert_eq!(err.to_string(), "series 12: expected 7 events, got 6");

        let err = EngineError::OutOfOrderSeries { id: 3, prev: 5 };
        assert!(err.to_string().contains("not greater than"));
    }

    #[test]
    fn test_seed_failure_wraps_source() {
        let inner = EngineError::EmptyResult;
        let err = EngineError::SeedFailure {
            seed: 7,
            source: Box::new(inner),
        };
        assert!(err.to_string().starts_with("seed 7 failed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
