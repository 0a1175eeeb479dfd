//! drawcast - adaptive scoring and search for fixed-size subset forecasts.
//!
//! Recommends a 14-number subset of a 25-number domain, approximating an
//! unknown future draw from a history of observed draws grouped into
//! ordered series.
//!
//! # Architecture
//!
//! ```text
//! History Stream → Learning Step → Weight Store → Generator → Scorer
//!       ↓               ↓              ↓             ↓          ↓
//!   validated       per-series     singles/      weighted    additive
//!   series, id      critical       pairs/        sampling    linear
//!   ordered         mismatch       triplets      w/o repl.   combination
//!
//!                 → Local Refiner → Ensemble Driver → Ranked Result
//!                        ↓                ↓                ↓
//!                    exact-k swap     parallel seeds,   diversity
//!                    neighborhoods    failure isolation  filtered
//! ```
//!
//! The matching problem is a rare-event search over C(25,14) ≈ 4.46M
//! subsets; nothing here guarantees finding the true future draw. What the
//! engine does guarantee is reproducibility (every stochastic draw flows
//! from one seeded RNG per ensemble member) and bounded learned state.
//!
//! # Concurrency
//!
//! Ensemble seeds share no mutable state and fan out via rayon. Within a
//! seed, learning replay is strictly sequential; refinement evaluation is
//! parallel over a frozen weight snapshot.
//!
//! The core performs no I/O: dataset loading, persistence, and reporting
//! belong to external callers, which feed a [`TrainingStream`] in and
//! consume a [`PredictionResult`] out.

pub mod config;
pub mod error;
pub mod model;
pub mod search;
pub mod training;
pub mod types;

// Re-export core types
pub use error::EngineError;
pub use model::{imbalance_penalty, score, RecencyWindow, WeightStore};
pub use search::{draw_event, generate, refine, EnsembleDriver, RefineOutcome};
pub use training::{backtest, Learner, ReplayReport, SeriesOutcome, TrainingStream};
pub use types::{
    Candidate, CriticalPolicy, EngineConfig, Event, Number, PredictionResult, Provenance,
    Series, EVENTS_PER_SERIES,
};
