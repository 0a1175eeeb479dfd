//! Candidate scoring - a pure function over the learned weights.
//!
//! The score is a weighted linear combination of additive terms:
//!
//! ```text
//! score = Σ number_weight[n]                      for n in candidate
//!       + Σ pair_weight[{a,b}]   × pair_multiplier
//!       + Σ triplet_weight[{a,b,c}] × triplet_multiplier
//!       + |candidate ∩ hot|      × hot_boost
//!       + |candidate ∩ cold|     × cold_boost
//!       + |candidate ∩ critical| × critical_boost
//!       − imbalance_penalty(candidate)            (soft, bounded)
//! ```
//!
//! Every term is additive, so the result is invariant to summation order
//! (up to float tolerance) and partial sums can be evaluated in parallel.
//!
//! The imbalance penalty is deliberately soft. Hard distribution filters
//! were tried in the field and measurably reduced hit quality - a penalty
//! can nudge the search away from lopsided candidates without ever making
//! one unreachable.

use crate::types::{EngineConfig, Event};

use super::recency::RecencyWindow;
use super::weights::WeightStore;

/// Score a candidate against the learned weights and recency signals.
/// Pure: no side effects, no RNG, same inputs give the same output.
pub fn score(
    candidate: &Event,
    store: &WeightStore,
    recency: &RecencyWindow,
    config: &EngineConfig,
) -> f64 {
    let numbers = candidate.numbers();

    let mut total = 0.0;
    for &n in numbers {
        total += store.number_weight(n);
    }

    if config.pair_multiplier != 0.0 {
        let mut pair_sum = 0.0;
        for i in 0..numbers.len() {
            for j in (i + 1)..numbers.len() {
                pair_sum += store.pair_weight(numbers[i], numbers[j]);
            }
        }
        total += pair_sum * config.pair_multiplier;
    }

    if config.triplet_multiplier != 0.0 {
        let mut triplet_sum = 0.0;
        for i in 0..numbers.len() {
            for j in (i + 1)..numbers.len() {
                for k in (j + 1)..numbers.len() {
                    triplet_sum +=
                        store.triplet_weight(numbers[i], numbers[j], numbers[k]);
                }
            }
        }
        total += triplet_sum * config.triplet_multiplier;
    }

    let mut hot_hits = 0usize;
    let mut cold_hits = 0usize;
    let mut critical_hits = 0usize;
    for &n in numbers {
        if recency.is_hot(n) {
            hot_hits += 1;
        }
        if recency.is_cold(n) {
            cold_hits += 1;
        }
        if store.is_critical(n) {
            critical_hits += 1;
        }
    }
    total += hot_hits as f64 * config.hot_boost;
    total += cold_hits as f64 * config.cold_boost;
    total += critical_hits as f64 * config.critical_boost;

    if config.imbalance_penalty > 0.0 {
        total -= imbalance_penalty(candidate, config);
    }

    total
}

/// Soft penalty for deviation from the expected per-range number count.
///
/// The domain is split into `imbalance_ranges` contiguous ranges; a
/// candidate drawn uniformly would land `event_size × width / domain_size`
/// numbers in each. The penalty is the absolute deviation summed over
/// ranges, scaled by `imbalance_penalty` - bounded (deviation can never
/// exceed 2 × event_size) and never an exclusion.
pub fn imbalance_penalty(candidate: &Event, config: &EngineConfig) -> f64 {
    if config.imbalance_ranges == 0 {
        return 0.0;
    }
    let domain = config.domain_size as usize;
    let ranges = config.imbalance_ranges.min(domain);
    let width = domain.div_ceil(ranges);

    let mut counts = vec![0usize; ranges];
    for &n in candidate.numbers() {
        let idx = ((n as usize - 1) / width).min(ranges - 1);
        counts[idx] += 1;
    }

    let mut deviation = 0.0;
    for (idx, &count) in counts.iter().enumerate() {
        let range_start = idx * width;
        let range_width = width.min(domain - range_start);
        let expected = candidate.len() as f64 * range_width as f64 / domain as f64;
        deviation += (count as f64 - expected).abs();
    }
    deviation * config.imbalance_penalty
}
