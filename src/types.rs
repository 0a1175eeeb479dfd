//! Core types for drawcast - the adaptive subset-forecast engine.
//!
//! Key design decisions:
//! - `Event` stores its numbers sorted ascending behind a validating
//!   constructor, so every downstream component can binary-search and
//!   two-pointer intersect without re-checking invariants.
//! - `Series` ids are the only notion of time in the system. There are no
//!   timestamps anywhere; ordering is total and explicit.
//! - `EngineConfig` keeps every tunable in one place so the competing
//!   strategy variants become presets over one scoring path instead of
//!   separate code paths.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A single number in the draw domain `[1, domain_size]`.
pub type Number = u8;

/// Events per series. A series is the atomic training/evaluation unit;
/// seven draws form one cycle.
pub const EVENTS_PER_SERIES: usize = 7;

/// One drawn subset: `event_size` distinct numbers, stored sorted ascending.
///
/// Construction goes through [`Event::new`], which enforces the size,
/// range, and distinctness invariants. Everything downstream relies on the
/// sorted representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    numbers: Vec<Number>,
}

impl Event {
    /// Validate and build an event. Sorts the input; rejects wrong sizes,
    /// out-of-domain numbers, and duplicates.
    pub fn new(
        mut numbers: Vec<Number>,
        domain_size: Number,
        event_size: usize,
    ) -> Result<Self, EngineError> {
        if numbers.len() != event_size {
            return Err(EngineError::InvalidEvent {
                reason: format!("expected {} numbers, got {}", event_size, numbers.len()),
            });
        }
        numbers.sort_unstable();
        for pair in numbers.windows(2) {
            if pair[0] == pair[1] {
                return Err(EngineError::InvalidEvent {
                    reason: format!("duplicate number {}", pair[0]),
                });
            }
        }
        if let Some(&first) = numbers.first() {
            if first < 1 {
                return Err(EngineError::InvalidEvent {
                    reason: "number 0 outside domain".to_string(),
                });
            }
        }
        if let Some(&last) = numbers.last() {
            if last > domain_size {
                return Err(EngineError::InvalidEvent {
                    reason: format!("number {} outside domain [1, {}]", last, domain_size),
                });
            }
        }
        Ok(Self { numbers })
    }

    /// Build from numbers already known to be sorted, distinct, in-domain.
    /// Used by the generator and refiner, which construct events from
    /// validated material only.
    pub(crate) fn from_sorted(numbers: Vec<Number>) -> Self {
        debug_assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        Self { numbers }
    }

    /// The numbers, sorted ascending.
    pub fn numbers(&self) -> &[Number] {
        &self.numbers
    }

    /// Number of elements in the subset.
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Membership test via binary search on the sorted representation.
    pub fn contains(&self, n: Number) -> bool {
        self.numbers.binary_search(&n).is_ok()
    }

    /// Size of the intersection with another event (two-pointer merge).
    pub fn overlap(&self, other: &Event) -> usize {
        let (mut i, mut j, mut hits) = (0, 0, 0);
        while i < self.numbers.len() && j < other.numbers.len() {
            match self.numbers[i].cmp(&other.numbers[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    hits += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        hits
    }

    /// Jaccard distance: `1 - |A ∩ B| / |A ∪ B|`. Two equal sets have
    /// distance 0.0; disjoint sets have distance 1.0.
    pub fn jaccard_distance(&self, other: &Event) -> f64 {
        let inter = self.overlap(other) as f64;
        let union = (self.numbers.len() + other.numbers.len()) as f64 - inter;
        if union == 0.0 {
            return 0.0;
        }
        1.0 - inter / union
    }
}

/// An ordered group of exactly [`EVENTS_PER_SERIES`] events, identified by a
/// monotonically increasing id. Series ids are the system's clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    id: u64,
    events: Vec<Event>,
}

impl Series {
    /// Validate and build a series. Event-level validation happens before
    /// this point; here we only enforce the event count.
    pub fn new(id: u64, events: Vec<Event>) -> Result<Self, EngineError> {
        if events.len() != EVENTS_PER_SERIES {
            return Err(EngineError::InvalidSeries {
                id,
                expected: EVENTS_PER_SERIES,
                got: events.len(),
            });
        }
        Ok(Self { id, events })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The most recent event of the series — the one the critical-number
    /// tracker reacts to.
    pub fn final_event(&self) -> &Event {
        // Invariant: events is non-empty (exactly EVENTS_PER_SERIES).
        &self.events[self.events.len() - 1]
    }
}

/// Where a candidate came from: which ensemble seed, and which draw in that
/// seed's pool produced the base it was refined from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub seed: u64,
    pub generation_index: usize,
}

/// A generated event tagged with its score and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub event: Event,
    pub score: f64,
    pub provenance: Provenance,
}

impl Candidate {
    pub fn new(event: Event, score: f64, provenance: Provenance) -> Self {
        Self {
            event,
            score,
            provenance,
        }
    }
}

/// Ordering by score (descending - highest first), tie-broken by the event's
/// numbers so sorts are reproducible across runs and thread schedules.
impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.event == other.event
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| self.event.numbers().cmp(other.event.numbers()))
    }
}

/// Final ranked output: candidates sorted by score descending, deduplicated
/// by set equality, filtered for pairwise diversity. Consumable by an
/// external reporting/persistence layer via serde.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionResult {
    pub candidates: Vec<Candidate>,
}

impl PredictionResult {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The highest-scoring candidate, if any.
    pub fn top(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// Critical-number tracking policy.
///
/// Both policies were tried in the field with conflicting conclusions, so
/// the choice stays configurable rather than hardcoded:
/// - `ClearReplace`: the set is rebuilt from the newest mismatch every
///   learning step. Maximally reactive.
/// - `AccumulateDecay`: mismatches accumulate with per-step decay, so a
///   number stays critical for a few steps after its mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CriticalPolicy {
    ClearReplace,
    AccumulateDecay,
}

impl Default for CriticalPolicy {
    fn default() -> Self {
        CriticalPolicy::ClearReplace
    }
}

/// Configuration for the whole engine.
/// All values are tunable at runtime for experimentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // Domain shape
    pub domain_size: Number,
    pub event_size: usize,

    // Recency window
    pub recency_window: usize,
    pub cold_count: usize,
    pub hot_count: usize,

    // Scoring multipliers. hot/cold/critical boosts double as the
    // generator's multiplicative draw-weight boosts.
    pub hot_boost: f64,
    pub cold_boost: f64,
    pub critical_boost: f64,
    pub pair_multiplier: f64,
    pub triplet_multiplier: f64,

    // Soft range-balance penalty. 0.0 disables. Never a hard filter:
    // hard distribution exclusion measurably hurts quality.
    pub imbalance_penalty: f64,
    pub imbalance_ranges: usize,

    // Learning
    pub single_boost: f64,
    pub learning_rate: f64,
    pub weight_cap: f64,
    pub decay_rate: Option<f64>,
    pub decay_cadence: u64,
    pub normalize_weights: bool,
    pub max_triplets: Option<usize>,
    pub critical_policy: CriticalPolicy,
    pub critical_decay: f64,

    // Search
    pub pool_size: usize,
    pub replay_pool_size: usize,
    pub local_search_k: usize,

    // Ensemble
    pub num_seeds: usize,
    pub base_seed: u64,
    pub top_n: usize,
    pub diversity_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Domain: 14 of 25
            domain_size: 25,
            event_size: 14,

            // Recency: 12 series = 84 events of lookback
            recency_window: 12,
            cold_count: 5,
            hot_count: 5,

            // Scoring
            hot_boost: 1.8,  // numbers due to repeat
            cold_boost: 1.5, // numbers due to reverse
            critical_boost: 6.0,
            pair_multiplier: 0.6,
            triplet_multiplier: 0.25,

            // Balance penalty off by default; enable via preset or config
            imbalance_penalty: 0.0,
            imbalance_ranges: 5,

            // Learning
            single_boost: 2.0,
            learning_rate: 1.0,
            weight_cap: 100.0,
            decay_rate: Some(0.97), // None disables
            decay_cadence: 10,
            normalize_weights: false,
            max_triplets: Some(4096),
            critical_policy: CriticalPolicy::ClearReplace,
            critical_decay: 0.6, // only read under AccumulateDecay

            // Search
            pool_size: 500,
            replay_pool_size: 50, // cheaper pool for per-series replay predictions
            local_search_k: 2,    // C(14,2) × C(11,2) = 5,005 variants

            // Ensemble
            num_seeds: 8,
            base_seed: 42,
            top_n: 5,
            diversity_threshold: 0.25,
        }
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot run with. `pool_size = 0`
    /// is the canonical "empty result" misconfiguration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.domain_size == 0 {
            return Err(EngineError::InvalidConfig("domain_size must be >= 1".into()));
        }
        if self.event_size == 0 || self.event_size > self.domain_size as usize {
            return Err(EngineError::InvalidConfig(format!(
                "event_size {} must be in [1, {}]",
                self.event_size, self.domain_size
            )));
        }
        if self.pool_size == 0 || self.replay_pool_size == 0 {
            return Err(EngineError::EmptyResult);
        }
        if self.cold_count + self.hot_count > self.domain_size as usize {
            return Err(EngineError::InvalidConfig(format!(
                "cold_count + hot_count = {} exceeds domain_size {}",
                self.cold_count + self.hot_count,
                self.domain_size
            )));
        }
        let complement = self.domain_size as usize - self.event_size;
        if self.local_search_k == 0
            || self.local_search_k > self.event_size
            || self.local_search_k > complement
        {
            return Err(EngineError::InvalidConfig(format!(
                "local_search_k {} must be in [1, min({}, {})]",
                self.local_search_k, self.event_size, complement
            )));
        }
        if self.num_seeds == 0 {
            return Err(EngineError::InvalidConfig("num_seeds must be >= 1".into()));
        }
        if self.top_n == 0 {
            return Err(EngineError::InvalidConfig("top_n must be >= 1".into()));
        }
        if !(0.0..=1.0).contains(&self.diversity_threshold) {
            return Err(EngineError::InvalidConfig(format!(
                "diversity_threshold {} must be in [0, 1]",
                self.diversity_threshold
            )));
        }
        if self.recency_window == 0 {
            return Err(EngineError::InvalidConfig(
                "recency_window must be >= 1".into(),
            ));
        }
        if let Some(rate) = self.decay_rate {
            if !(0.0..1.0).contains(&rate) {
                return Err(EngineError::InvalidConfig(format!(
                    "decay_rate {} must be in [0, 1)",
                    rate
                )));
            }
            if self.decay_cadence == 0 {
                return Err(EngineError::InvalidConfig(
                    "decay_cadence must be >= 1 when decay is enabled".into(),
                ));
            }
        }
        Ok(())
    }

    /// Pure global-frequency strategy: no recency or affinity signals.
    pub fn frequency_preset() -> Self {
        Self {
            hot_boost: 1.0,
            cold_boost: 1.0,
            pair_multiplier: 0.0,
            triplet_multiplier: 0.0,
            critical_boost: 1.0,
            ..Self::default()
        }
    }

    /// Recency-dominated strategy: hot/cold membership dwarfs base weights.
    pub fn hot_cold_preset() -> Self {
        Self {
            hot_boost: 3.0,
            cold_boost: 2.5,
            pair_multiplier: 0.2,
            triplet_multiplier: 0.0,
            ..Self::default()
        }
    }

    /// Default weighting plus the soft range-balance penalty.
    pub fn balanced_preset() -> Self {
        Self {
            imbalance_penalty: 1.5,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(numbers: &[Number]) -> Event {
        Event::new(numbers.to_vec(), 25, numbers.len()).unwrap()
    }

    #[test]
    fn test_event_sorts_input() {
        let e = Event::new(vec![5, 1, 3], 25, 3).unwrap();
        assert_eq!(e.numbers(), &[1, 3, 5]);
    }

    #[test]
    fn test_event_rejects_wrong_size() {
        let err = Event::new(vec![1, 2, 3], 25, 14).unwrap_err();
        assert!(matches!(err, EngineError::InvalidEvent { .. }));
    }

    #[test]
    fn test_event_rejects_duplicates() {
        let err = Event::new(vec![1, 2, 2], 25, 3).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_event_rejects_out_of_domain() {
        assert!(Event::new(vec![1, 2, 26], 25, 3).is_err());
        assert!(Event::new(vec![0, 2, 3], 25, 3).is_err());
    }

    #[test]
    fn test_overlap_and_contains() {
        let a = ev(&[1, 2, 3, 4]);
        let b = ev(&[3, 4, 5, 6]);
        assert_eq!(a.overlap(&b), 2);
        assert!(a.contains(3));
        assert!(!a.contains(9));
    }

    #[test]
    fn test_jaccard_distance() {
        let a = ev(&[1, 2, 3, 4]);
        assert_eq!(a.jaccard_distance(&a), 0.0);

        let disjoint = ev(&[5, 6, 7, 8]);
        assert_eq!(a.jaccard_distance(&disjoint), 1.0);

        // |∩| = 2, |∪| = 6 -> distance = 1 - 2/6
        let b = ev(&[3, 4, 5, 6]);
        assert!((a.jaccard_distance(&b) - (1.0 - 2.0 / 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_series_requires_seven_events() {
        let events: Vec<Event> = (0..6).map(|i| ev(&[i + 1, i + 2, i + 3])).collect();
        assert!(Series::new(1, events).is_err());

        let events: Vec<Event> = (0..7).map(|i| ev(&[i + 1, i + 2, i + 3])).collect();
        let series = Series::new(1, events).unwrap();
        assert_eq!(series.final_event().numbers(), &[7, 8, 9]);
    }

    #[test]
    fn test_candidate_ordering_descending_with_tiebreak() {
        let p = Provenance {
            seed: 0,
            generation_index: 0,
        };
        let mut candidates = vec![
            Candidate::new(ev(&[4, 5, 6]), 1.0, p),
            Candidate::new(ev(&[1, 2, 3]), 5.0, p),
            Candidate::new(ev(&[1, 2, 4]), 1.0, p),
        ];
        candidates.sort();
        assert_eq!(candidates[0].score, 5.0);
        // Equal scores: smaller number-set first
        assert_eq!(candidates[1].event.numbers(), &[1, 2, 4]);
        assert_eq!(candidates[2].event.numbers(), &[4, 5, 6]);
    }

    #[test]
    fn test_default_config_validates() {
        EngineConfig::default().validate().unwrap();
        EngineConfig::frequency_preset().validate().unwrap();
        EngineConfig::hot_cold_preset().validate().unwrap();
        EngineConfig::balanced_preset().validate().unwrap();
    }

    #[test]
    fn test_zero_pool_is_empty_result() {
        let cfg = EngineConfig {
            pool_size: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(EngineError::EmptyResult)));
    }

    #[test]
    fn test_oversized_swap_depth_rejected() {
        // k must fit both the event and its complement (25 - 14 = 11)
        let cfg = EngineConfig {
            local_search_k: 12,
            ..EngineConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_result_payload_serializes() {
        let result = PredictionResult {
            candidates: vec![Candidate::new(
                ev(&[1, 2, 3]),
                9.5,
                Provenance {
                    seed: 3,
                    generation_index: 17,
                },
            )],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"seed\":3"));
        let back: PredictionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.candidates[0].event, result.candidates[0].event);
    }
}
