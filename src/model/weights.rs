//! Learned weight state: per-number, per-pair, per-triplet, critical set.
//!
//! One `WeightStore` exists per ensemble seed and is owned by that seed's
//! learner; stores never share state, which is what makes the ensemble
//! trivially parallel.
//!
//! Weight families:
//! - **Singles**: bounded accumulation in `[0, weight_cap]`. The clamp is
//!   the invariant every other component relies on.
//! - **Pairs / triplets**: unbounded-by-default co-occurrence accumulation;
//!   triplets can be pruned to the top-K to bound memory (C(25,3) = 2,300
//!   keys is small, but long streams with decay disabled keep every key
//!   alive).
//! - **Critical**: numbers proven wrong in the latest prediction, tracked
//!   as strengths so both refresh policies share one representation.

use std::collections::HashMap;

use crate::types::{CriticalPolicy, EngineConfig, Event, Number};

use super::recency::RecencyWindow;

/// Draw-weight floor so unseen numbers can still be sampled. With an empty
/// store every number sits at the floor, which is exactly uniform sampling.
const WEIGHT_FLOOR: f64 = 1e-3;

/// Strength at or above which a tracked number counts as critical.
const CRITICAL_MEMBERSHIP: f64 = 0.5;

/// Strength below which a decayed critical entry is dropped.
const CRITICAL_EPSILON: f64 = 1e-3;

/// All learned scalar weights for one ensemble seed.
#[derive(Debug, Clone)]
pub struct WeightStore {
    /// Index 0 unused; numbers are 1-based.
    number_weight: Vec<f64>,
    pair_weight: HashMap<(Number, Number), f64>,
    triplet_weight: HashMap<(Number, Number, Number), f64>,
    /// Number -> strength. Membership = strength >= CRITICAL_MEMBERSHIP.
    critical: HashMap<Number, f64>,
    domain_size: Number,
    weight_cap: f64,
}

impl WeightStore {
    /// Fresh, empty store. Created once per seed at the start of a run.
    pub fn new(domain_size: Number, weight_cap: f64) -> Self {
        Self {
            number_weight: vec![0.0; domain_size as usize + 1],
            pair_weight: HashMap::new(),
            triplet_weight: HashMap::new(),
            critical: HashMap::new(),
            domain_size,
            weight_cap,
        }
    }

    pub fn domain_size(&self) -> Number {
        self.domain_size
    }

    pub fn weight_cap(&self) -> f64 {
        self.weight_cap
    }

    /// Base weight of a number, always in `[0, weight_cap]`.
    pub fn number_weight(&self, n: Number) -> f64 {
        self.number_weight.get(n as usize).copied().unwrap_or(0.0)
    }

    /// Co-occurrence weight of an unordered pair.
    pub fn pair_weight(&self, a: Number, b: Number) -> f64 {
        self.pair_weight
            .get(&pair_key(a, b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Co-occurrence weight of an unordered triple.
    pub fn triplet_weight(&self, a: Number, b: Number, c: Number) -> f64 {
        self.triplet_weight
            .get(&triplet_key(a, b, c))
            .copied()
            .unwrap_or(0.0)
    }

    /// Increase each revealed number's weight by `boost`, clamped to the cap.
    pub fn update_singles(&mut self, event: &Event, boost: f64) {
        for &n in event.numbers() {
            let w = &mut self.number_weight[n as usize];
            *w = (*w + boost).clamp(0.0, self.weight_cap);
        }
    }

    /// Increment every unordered pair within the revealed event.
    pub fn update_pairs(&mut self, event: &Event, increment: f64) {
        let numbers = event.numbers();
        for i in 0..numbers.len() {
            for j in (i + 1)..numbers.len() {
                *self
                    .pair_weight
                    .entry((numbers[i], numbers[j]))
                    .or_insert(0.0) += increment;
            }
        }
    }

    /// Increment every unordered triple within the revealed event.
    pub fn update_triplets(&mut self, event: &Event, increment: f64) {
        let numbers = event.numbers();
        for i in 0..numbers.len() {
            for j in (i + 1)..numbers.len() {
                for k in (j + 1)..numbers.len() {
                    *self
                        .triplet_weight
                        .entry((numbers[i], numbers[j], numbers[k]))
                        .or_insert(0.0) += increment;
                }
            }
        }
    }

    /// Keep only the `keep` heaviest triplet entries. Tie-break by key so
    /// pruning is deterministic across runs.
    pub fn prune_triplets(&mut self, keep: usize) {
        if self.triplet_weight.len() <= keep {
            return;
        }
        let mut entries: Vec<_> = self.triplet_weight.drain().collect();
        entries.sort_by(|(ka, wa), (kb, wb)| {
            wb.partial_cmp(wa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| ka.cmp(kb))
        });
        entries.truncate(keep);
        self.triplet_weight = entries.into_iter().collect();
    }

    /// One-shot "this was just proven important": critical numbers jump
    /// straight to the cap.
    pub fn boost_critical(&mut self, critical: &[Number]) {
        for &n in critical {
            if (n as usize) < self.number_weight.len() {
                self.number_weight[n as usize] = self.weight_cap;
            }
        }
    }

    /// Refresh the tracked critical set with the newest mismatch.
    pub fn refresh_critical(&mut self, fresh: &[Number], policy: CriticalPolicy, decay: f64) {
        match policy {
            CriticalPolicy::ClearReplace => {
                self.critical.clear();
            }
            CriticalPolicy::AccumulateDecay => {
                self.critical.retain(|_, strength| {
                    *strength *= decay;
                    *strength >= CRITICAL_EPSILON
                });
            }
        }
        for &n in fresh {
            self.critical.insert(n, 1.0);
        }
    }

    pub fn is_critical(&self, n: Number) -> bool {
        self.critical
            .get(&n)
            .is_some_and(|&s| s >= CRITICAL_MEMBERSHIP)
    }

    /// Current critical numbers, sorted ascending.
    pub fn critical_numbers(&self) -> Vec<Number> {
        let mut numbers: Vec<Number> = self
            .critical
            .iter()
            .filter(|(_, &s)| s >= CRITICAL_MEMBERSHIP)
            .map(|(&n, _)| n)
            .collect();
        numbers.sort_unstable();
        numbers
    }

    /// Multiply every weight by `rate`, bounding drift from stale eras.
    /// Pair/triplet entries that decay to dust are dropped.
    pub fn decay(&mut self, rate: f64) {
        for w in &mut self.number_weight {
            *w *= rate;
        }
        self.pair_weight.retain(|_, w| {
            *w *= rate;
            *w >= CRITICAL_EPSILON
        });
        self.triplet_weight.retain(|_, w| {
            *w *= rate;
            *w >= CRITICAL_EPSILON
        });
    }

    /// Rescale each weight family so its maximum equals `cap`, preserving
    /// ratios within the family. No-op for an all-zero family.
    pub fn normalize(&mut self, cap: f64) {
        let max_single = self
            .number_weight
            .iter()
            .cloned()
            .fold(0.0_f64, f64::max);
        if max_single > 0.0 {
            let factor = cap / max_single;
            for w in &mut self.number_weight {
                *w *= factor;
            }
        }
        let max_pair = self.pair_weight.values().cloned().fold(0.0_f64, f64::max);
        if max_pair > 0.0 {
            let factor = cap / max_pair;
            for w in self.pair_weight.values_mut() {
                *w *= factor;
            }
        }
        let max_triplet = self
            .triplet_weight
            .values()
            .cloned()
            .fold(0.0_f64, f64::max);
        if max_triplet > 0.0 {
            let factor = cap / max_triplet;
            for w in self.triplet_weight.values_mut() {
                *w *= factor;
            }
        }
    }

    /// Composite sampling weight for the generator: base weight floored so
    /// unseen numbers stay reachable, multiplied by hot/cold/critical
    /// membership boosts. Hot numbers are due to repeat; cold numbers are
    /// due to reverse; both get boosted.
    pub fn draw_weight(&self, n: Number, recency: &RecencyWindow, config: &EngineConfig) -> f64 {
        let mut weight = self.number_weight(n).max(WEIGHT_FLOOR);
        if recency.is_hot(n) {
            weight *= config.hot_boost;
        }
        if recency.is_cold(n) {
            weight *= config.cold_boost;
        }
        if self.is_critical(n) {
            weight *= config.critical_boost;
        }
        weight
    }
}

fn pair_key(a: Number, b: Number) -> (Number, Number) {
    if a <= b { (a, b) } else { (b, a) }
}

fn triplet_key(a: Number, b: Number, c: Number) -> (Number, Number, Number) {
    let mut key = [a, b, c];
    key.sort_unstable();
    (key[0], key[1], key[2])
}
