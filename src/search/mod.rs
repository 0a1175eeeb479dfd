//! Candidate search: stochastic generation, bounded local refinement, and
//! the parallel multi-seed ensemble that ties a whole run together.
//!
//! The split of responsibilities:
//! - `generator` is the *only* component that consumes the RNG
//! - `refine` is exhaustive and deterministic over a swap neighborhood
//! - `ensemble` owns orchestration: per-seed replay, isolation of seed
//!   failures, and diversity-aware aggregation of the winners

mod ensemble;
mod generator;
mod refine;

pub use ensemble::EnsembleDriver;
pub use generator::{draw_event, generate};
pub use refine::{refine, RefineOutcome};
