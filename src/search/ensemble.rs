//! Multi-seed ensemble orchestration.
//!
//! Each seed is a fully independent run: fresh weight store, its own RNG
//! stream, sequential learning replay over the history, pool generation
//! from the frozen post-training snapshot, then local refinement of the
//! best pool candidate. Seeds share nothing mutable, so they fan out
//! across rayon workers and scale with core count.
//!
//! Per-seed state machine:
//!
//! ```text
//! INIT -> TRAINING(series 1..n) -> GENERATING -> REFINING -> DONE
//! ```
//!
//! No seed ever transitions backwards, and one seed's failure is isolated:
//! it is logged, excluded from aggregation, and its siblings keep running.
//! Only the all-seeds-failed case aborts the run.
//!
//! Aggregation merges every seed's best candidate, sorts by score with a
//! deterministic tie-break, deduplicates by set equality, then greedily
//! keeps up to `top_n` results whose pairwise Jaccard distance stays above
//! the diversity threshold - near-duplicate recommendations are worthless
//! to a consumer who wants coverage.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::model::{score, RecencyWindow, WeightStore};
use crate::training::{Learner, TrainingStream};
use crate::types::{Candidate, EngineConfig, Event, PredictionResult, Provenance};

use super::generator::{draw_event, generate};
use super::refine::refine;

/// Orchestrates independent (seed, weight-store) runs and aggregates their
/// best candidates into one ranked, diversity-filtered result.
#[derive(Debug, Clone)]
pub struct EnsembleDriver {
    config: EngineConfig,
}

impl EnsembleDriver {
    /// Validate the configuration up front; a driver that exists can run.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Train on the whole stream and produce the ranked ensemble result.
    pub fn run(&self, stream: &TrainingStream) -> Result<PredictionResult, EngineError> {
        self.run_inner(stream, None)
    }

    /// Like [`run`](Self::run), with cooperative early-stop: once any seed
    /// refines its candidate into an exact match of `target`, in-flight
    /// seeds abandon their remaining work. Abandoned seeds are discarded,
    /// not failed - aggregation uses whatever completed.
    pub fn run_with_target(
        &self,
        stream: &TrainingStream,
        target: &Event,
    ) -> Result<PredictionResult, EngineError> {
        self.run_inner(stream, Some(target))
    }

    fn run_inner(
        &self,
        stream: &TrainingStream,
        target: Option<&Event>,
    ) -> Result<PredictionResult, EngineError> {
        let seeds: Vec<u64> = (0..self.config.num_seeds)
            .map(|i| self.config.base_seed.wrapping_add(i as u64))
            .collect();
        let stop = AtomicBool::new(false);

        let outcomes: Vec<(u64, Result<Option<Candidate>, EngineError>)> = seeds
            .par_iter()
            .map(|&seed| (seed, self.run_seed(stream, seed, target, &stop)))
            .collect();

        let mut candidates = Vec::new();
        let mut failures = 0usize;
        for (seed, outcome) in outcomes {
            match outcome {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => debug!(seed, "seed abandoned after early stop"),
                Err(source) => {
                    failures += 1;
                    let err = EngineError::SeedFailure {
                        seed,
                        source: Box::new(source),
                    };
                    warn!(seed, error = %err, "ensemble seed failed; continuing");
                }
            }
        }

        if candidates.is_empty() {
            if failures == self.config.num_seeds {
                return Err(EngineError::AllSeedsFailed(failures));
            }
            return Err(EngineError::EmptyResult);
        }

        Ok(self.aggregate(candidates))
    }

    /// One seed's complete journey: replay, generate, refine.
    fn run_seed(
        &self,
        stream: &TrainingStream,
        seed: u64,
        target: Option<&Event>,
        stop: &AtomicBool,
    ) -> Result<Option<Candidate>, EngineError> {
        let config = &self.config;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut learner = Learner::new(config.clone());

        // TRAINING: strictly sequential replay in series-id order. Each
        // step predicts from the weights-so-far, then reveals the truth.
        let mut seen: usize = 0;
        for series in stream.iter() {
            if stop.load(Ordering::Relaxed) {
                return Ok(None);
            }
            let recency = RecencyWindow::compute(
                &stream.series()[..seen],
                config.domain_size,
                config.recency_window,
                config.cold_count,
                config.hot_count,
            );
            let predicted = best_of_pool(
                generate(
                    learner.store(),
                    &recency,
                    config,
                    &mut rng,
                    config.replay_pool_size,
                ),
                learner.store(),
                &recency,
                config,
            )
            .map(|(event, _, _)| event)
            .unwrap_or_else(|| draw_event(learner.store(), &recency, config, &mut rng));
            learner.observe_series(&predicted, series);
            seen += 1;
        }

        if stop.load(Ordering::Relaxed) {
            return Ok(None);
        }

        // GENERATING: frozen snapshot of the trained weights.
        let recency = RecencyWindow::compute(
            stream.series(),
            config.domain_size,
            config.recency_window,
            config.cold_count,
            config.hot_count,
        );
        let pool = generate(learner.store(), &recency, config, &mut rng, config.pool_size);
        let (base, base_score, generation_index) =
            best_of_pool(pool, learner.store(), &recency, config)
                .ok_or(EngineError::EmptyResult)?;

        if stop.load(Ordering::Relaxed) {
            return Ok(None);
        }

        // REFINING: bounded swap search around the best pool candidate.
        let store = learner.store();
        let outcome = refine(&base, config.domain_size, config.local_search_k, |event| {
            score(event, store, &recency, config)
        });
        debug!(
            seed,
            base_score,
            refined_score = outcome.score,
            variants = outcome.variants,
            "seed complete"
        );

        if let Some(target) = target {
            if outcome.best.overlap(target) == target.len() {
                stop.store(true, Ordering::Relaxed);
            }
        }

        Ok(Some(Candidate::new(
            outcome.best,
            outcome.score,
            Provenance {
                seed,
                generation_index,
            },
        )))
    }

    /// Merge per-seed winners: sort, dedup by set equality, then greedy
    /// diversity selection.
    fn aggregate(&self, mut candidates: Vec<Candidate>) -> PredictionResult {
        candidates.sort();

        let mut selected: Vec<Candidate> = Vec::new();
        for candidate in candidates {
            if selected.len() >= self.config.top_n {
                break;
            }
            let duplicate = selected.iter().any(|s| s.event == candidate.event);
            if duplicate {
                continue;
            }
            let diverse = selected.iter().all(|s| {
                s.event.jaccard_distance(&candidate.event) >= self.config.diversity_threshold
            });
            if diverse {
                selected.push(candidate);
            }
        }
        PredictionResult {
            candidates: selected,
        }
    }
}

/// Best candidate of a pool by score, ties broken toward the smaller
/// number set. Returns the winning event, its score, and its pool index.
fn best_of_pool(
    pool: Vec<Event>,
    store: &WeightStore,
    recency: &RecencyWindow,
    config: &EngineConfig,
) -> Option<(Event, f64, usize)> {
    pool.into_iter()
        .enumerate()
        .map(|(idx, event)| {
            let s = score(&event, store, recency, config);
            (event, s, idx)
        })
        .reduce(|a, b| {
            match a.1.partial_cmp(&b.1) {
                Some(std::cmp::Ordering::Greater) => a,
                Some(std::cmp::Ordering::Less) => b,
                _ => {
                    if a.0.numbers() <= b.0.numbers() {
                        a
                    } else {
                        b
                    }
                }
            }
        })
}
