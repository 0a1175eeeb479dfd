//! Bounded local search over exact-k swap neighborhoods.
//!
//! Given a base event, enumerate every way to remove `k` of its numbers and
//! add `k` from the complement - `C(event_size, k) × C(domain − event_size, k)`
//! variants - evaluate each, and keep the best. For the default domain
//! (14 of 25) at `k = 2` that is `C(14,2) × C(11,2) = 91 × 55 = 5,005`
//! variants: exhaustive yet cheap.
//!
//! `k = 1` is too weak to escape local structure; `k = 3` already costs
//! `364 × 165 = 60,060` evaluations. Evaluation is embarrassingly parallel
//! and runs through rayon once the variant count justifies the fan-out.
//!
//! The evaluate function is supplied by the caller: the scorer during
//! normal runs, or an exact-match oracle when validating against revealed
//! history. The refiner never mutates learned state.

use rayon::prelude::*;

use crate::types::{Event, Number};

/// Below this many variants the rayon fan-out costs more than it saves.
const PARALLEL_THRESHOLD: usize = 2_000;

/// Result of one refinement pass.
#[derive(Debug, Clone)]
pub struct RefineOutcome {
    /// Best event found - the base itself when no variant beats it.
    pub best: Event,
    /// Evaluation of `best`.
    pub score: f64,
    /// Number of swap variants enumerated (excludes the base).
    pub variants: usize,
}

/// Exhaustively search the exact-k swap neighborhood of `base`.
///
/// Returns the highest-evaluating event found, falling back to `base` when
/// no variant strictly beats it - the returned score is therefore always
/// >= the base's evaluation. Ties between variants break toward the
/// lexicographically smallest number set, keeping the result independent
/// of evaluation order and thread scheduling.
pub fn refine<F>(base: &Event, domain_size: Number, k: usize, evaluate: F) -> RefineOutcome
where
    F: Fn(&Event) -> f64 + Sync,
{
    let base_score = evaluate(base);

    let complement: Vec<Number> = (1..=domain_size)
        .filter(|&n| !base.contains(n))
        .collect();
    if k == 0 || k > base.len() || k > complement.len() {
        return RefineOutcome {
            best: base.clone(),
            score: base_score,
            variants: 0,
        };
    }

    let removals = k_subsets(base.numbers(), k);
    let additions = k_subsets(&complement, k);

    let mut variants = Vec::with_capacity(removals.len() * additions.len());
    for removal in &removals {
        let kept: Vec<Number> = base
            .numbers()
            .iter()
            .filter(|n| !removal.contains(n))
            .copied()
            .collect();
        for addition in &additions {
            let mut numbers = kept.clone();
            numbers.extend_from_slice(addition);
            numbers.sort_unstable();
            variants.push(Event::from_sorted(numbers));
        }
    }
    let n_variants = variants.len();

    let best_variant = if n_variants >= PARALLEL_THRESHOLD {
        variants
            .into_par_iter()
            .map(|event| {
                let score = evaluate(&event);
                (score, event)
            })
            .reduce_with(pick_better)
    } else {
        variants
            .into_iter()
            .map(|event| {
                let score = evaluate(&event);
                (score, event)
            })
            .reduce(pick_better)
    };

    match best_variant {
        Some((score, event)) if score > base_score => RefineOutcome {
            best: event,
            score,
            variants: n_variants,
        },
        _ => RefineOutcome {
            best: base.clone(),
            score: base_score,
            variants: n_variants,
        },
    }
}

/// Total, deterministic comparison: higher score wins; equal scores go to
/// the lexicographically smaller number set.
fn pick_better(a: (f64, Event), b: (f64, Event)) -> (f64, Event) {
    match a.0.partial_cmp(&b.0) {
        Some(std::cmp::Ordering::Greater) => a,
        Some(std::cmp::Ordering::Less) => b,
        _ => {
            if a.1.numbers() <= b.1.numbers() {
                a
            } else {
                b
            }
        }
    }
}

/// All k-element subsets of `items`, in lexicographic index order.
fn k_subsets(items: &[Number], k: usize) -> Vec<Vec<Number>> {
    let n = items.len();
    if k > n {
        return Vec::new();
    }
    if k == 0 {
        return vec![Vec::new()];
    }
    let mut result = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        result.push(indices.iter().map(|&i| items[i]).collect());
        // Advance to the next combination; done when the first index can
        // no longer move.
        let mut pos = k;
        while pos > 0 {
            pos -= 1;
            if indices[pos] != pos + n - k {
                indices[pos] += 1;
                for later in (pos + 1)..k {
                    indices[later] = indices[later - 1] + 1;
                }
                break;
            }
            if pos == 0 {
                return result;
            }
        }
    }
}
