//! Training infrastructure: the validated stream, the learning step, and
//! replay evaluation.
//!
//! History is the only training signal the system has. Each newly revealed
//! series is compared against what the engine would have predicted for it,
//! and the mismatch drives the weight updates - missed numbers and wrongly
//! included numbers become "critical" and jump to the weight cap.
//!
//! Strict ordering matters everywhere here: learning steps apply once per
//! series, in series-id order, because the critical set encodes "the most
//! recent mismatch" and out-of-order application silently corrupts that.

mod learn;
mod metrics;
mod stream;

pub use learn::Learner;
pub use metrics::{backtest, ReplayReport, SeriesOutcome};
pub use stream::TrainingStream;
