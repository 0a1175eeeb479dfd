//! Weight model - learned state and the scoring function over it.
//!
//! The model side of the engine is deliberately passive: it holds learned
//! weights and derives signals, but never draws random numbers and never
//! advances time. Mutation happens only through the learning step in
//! `training::learn`; the generator and refiner in `search` read a frozen
//! snapshot.

mod recency;
mod scorer;
mod weights;

pub use recency::RecencyWindow;
pub use scorer::{imbalance_penalty, score};
pub use weights::WeightStore;
