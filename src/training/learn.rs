//! The learning step - sole mutator of a seed's weight store.
//!
//! `observe` is the online-learning heartbeat: compare what we predicted
//! with what actually happened, mark the disagreement as critical, and fold
//! the revealed numbers into the weight families. One learner exists per
//! ensemble seed and owns its store outright; there is no shared model.
//!
//! Update order within a step:
//! 1. structural updates (singles, pairs, triplets) from the revealed truth
//! 2. cadence maintenance (decay / normalize / triplet pruning)
//! 3. critical refresh + boost, last - so "critical => weight == cap"
//!    holds the moment the step returns

use tracing::debug;

use crate::model::WeightStore;
use crate::types::{EngineConfig, Event, Number, Series};

/// Owns one [`WeightStore`] and advances it one series at a time.
#[derive(Debug)]
pub struct Learner {
    store: WeightStore,
    config: EngineConfig,
    steps: u64,
}

impl Learner {
    /// Fresh learner with an empty store. One per ensemble seed.
    pub fn new(config: EngineConfig) -> Self {
        let store = WeightStore::new(config.domain_size, config.weight_cap);
        Self {
            store,
            config,
            steps: 0,
        }
    }

    /// Read-only view of the learned weights. Snapshots for generation are
    /// taken from here strictly after replay completes.
    pub fn store(&self) -> &WeightStore {
        &self.store
    }

    /// Learning steps applied so far (== series observed).
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Observe one revealed event against the prediction made for it.
    /// Returns the critical set: numbers missed plus numbers wrongly
    /// included, sorted ascending.
    pub fn observe(&mut self, predicted: &Event, actual: &Event) -> Vec<Number> {
        self.apply_structural(std::slice::from_ref(actual));
        self.advance_step();
        self.apply_critical(predicted, actual)
    }

    /// Observe one revealed series: structural updates from all of its
    /// events, critical set from its final event - the most recent
    /// mismatch is the one worth reacting to. Strictly once per series,
    /// in series-id order.
    pub fn observe_series(&mut self, predicted: &Event, series: &Series) -> Vec<Number> {
        self.apply_structural(series.events());
        self.advance_step();
        let critical = self.apply_critical(predicted, series.final_event());
        debug!(
            series_id = series.id(),
            step = self.steps,
            critical = critical.len(),
            "learning step applied"
        );
        critical
    }

    fn apply_structural(&mut self, events: &[Event]) {
        for event in events {
            self.store.update_singles(event, self.config.single_boost);
            self.store.update_pairs(event, self.config.learning_rate);
            self.store
                .update_triplets(event, self.config.learning_rate);
        }
        if let Some(keep) = self.config.max_triplets {
            self.store.prune_triplets(keep);
        }
    }

    fn advance_step(&mut self) {
        self.steps += 1;
        if let Some(rate) = self.config.decay_rate {
            if self.steps % self.config.decay_cadence == 0 {
                self.store.decay(rate);
            }
        }
        if self.config.normalize_weights && self.steps % self.config.decay_cadence == 0 {
            self.store.normalize(self.config.weight_cap);
        }
    }

    fn apply_critical(&mut self, predicted: &Event, actual: &Event) -> Vec<Number> {
        // Missed: in actual, not predicted. Wrongly included: the reverse.
        let mut critical: Vec<Number> = actual
            .numbers()
            .iter()
            .filter(|&&n| !predicted.contains(n))
            .chain(
                predicted
                    .numbers()
                    .iter()
                    .filter(|&&n| !actual.contains(n)),
            )
            .copied()
            .collect();
        critical.sort_unstable();

        self.store.refresh_critical(
            &critical,
            self.config.critical_policy,
            self.config.critical_decay,
        );
        self.store.boost_critical(&critical);
        critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CriticalPolicy, EVENTS_PER_SERIES};

    fn ev(numbers: &[Number]) -> Event {
        Event::new(numbers.to_vec(), 25, numbers.len()).unwrap()
    }

    fn config() -> EngineConfig {
        EngineConfig {
            decay_rate: None,
            max_triplets: None,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_critical_set_is_symmetric_difference() {
        let mut learner = Learner::new(config());
        let predicted = ev(&[1, 2, 3, 4]);
        let actual = ev(&[3, 4, 5, 6]);
        let critical = learner.observe(&predicted, &actual);
        // missed {5, 6} ∪ wrongly included {1, 2}
        assert_eq!(critical, vec![1, 2, 5, 6]);
    }

    #[test]
    fn test_perfect_prediction_has_no_criticals() {
        let mut learner = Learner::new(config());
        let event = ev(&[1, 2, 3, 4]);
        assert!(learner.observe(&event, &event).is_empty());
    }

    #[test]
    fn test_critical_numbers_sit_at_cap_after_observe() {
        let mut learner = Learner::new(config());
        let predicted = ev(&[1, 2, 3]);
        let actual = ev(&[1, 2, 9]);
        let critical = learner.observe(&predicted, &actual);
        for n in critical {
            assert_eq!(
                learner.store().number_weight(n),
                learner.store().weight_cap(),
                "critical number {} must sit at the cap",
                n
            );
        }
    }

    #[test]
    fn test_critical_at_cap_even_when_decay_fires_same_step() {
        // Decay on every step; boost happens after maintenance, so the
        // critical number still reads exactly cap.
        let cfg = EngineConfig {
            decay_rate: Some(0.5),
            decay_cadence: 1,
            ..config()
        };
        let mut learner = Learner::new(cfg);
        let critical = learner.observe(&ev(&[1, 2, 3]), &ev(&[1, 2, 9]));
        assert!(critical.contains(&9));
        assert_eq!(
            learner.store().number_weight(9),
            learner.store().weight_cap()
        );
    }

    #[test]
    fn test_structural_updates_use_actual_not_predicted() {
        let mut learner = Learner::new(config());
        let predicted = ev(&[20, 21, 22]);
        let actual = ev(&[1, 2, 3]);
        learner.observe(&predicted, &actual);
        assert!(learner.store().pair_weight(1, 2) > 0.0);
        // Predicted-only pairs learn nothing
        assert_eq!(learner.store().pair_weight(20, 21), 0.0);
    }

    #[test]
    fn test_observe_series_counts_one_step() {
        let mut learner = Learner::new(config());
        let events: Vec<Event> = vec![ev(&[1, 2, 3]); EVENTS_PER_SERIES];
        let series = Series::new(7, events).unwrap();
        learner.observe_series(&ev(&[1, 2, 3]), &series);
        assert_eq!(learner.steps(), 1);
        // All 7 events contributed singles: 7 × single_boost, clamped by cap
        let expected = (7.0 * learner.config.single_boost).min(learner.config.weight_cap);
        assert_eq!(learner.store().number_weight(1), expected);
    }

    #[test]
    fn test_observe_series_reacts_to_final_event() {
        let mut learner = Learner::new(config());
        let mut events: Vec<Event> = vec![ev(&[1, 2, 3]); EVENTS_PER_SERIES - 1];
        events.push(ev(&[10, 11, 12]));
        let series = Series::new(1, events).unwrap();
        let critical = learner.observe_series(&ev(&[10, 11, 13]), &series);
        // vs final event {10,11,12}: missed 12, wrongly included 13
        assert_eq!(critical, vec![12, 13]);
    }

    #[test]
    fn test_decay_cadence_fires_every_n_steps() {
        let cfg = EngineConfig {
            decay_rate: Some(0.5),
            decay_cadence: 2,
            single_boost: 8.0,
            ..config()
        };
        let mut learner = Learner::new(cfg);
        let event = ev(&[4, 5, 6]);
        // Step 1: no decay, no mismatch. 4 sits at 8.0
        learner.observe(&event, &event);
        assert_eq!(learner.store().number_weight(4), 8.0);
        // Step 2: accumulate to 16.0, then cadence decay halves it
        learner.observe(&event, &event);
        assert_eq!(learner.store().number_weight(4), 8.0);
    }

    #[test]
    fn test_clear_replace_tracks_only_newest_mismatch() {
        let mut learner = Learner::new(EngineConfig {
            critical_policy: CriticalPolicy::ClearReplace,
            ..config()
        });
        learner.observe(&ev(&[1, 2]), &ev(&[1, 9]));
        learner.observe(&ev(&[1, 9]), &ev(&[1, 5]));
        // Only the latest mismatch {9 out, 5 in} remains critical
        assert_eq!(learner.store().critical_numbers(), vec![5, 9]);
        assert!(!learner.store().is_critical(2));
    }

    #[test]
    fn test_triplet_pruning_bounds_memory() {
        let cfg = EngineConfig {
            max_triplets: Some(10),
            ..config()
        };
        let mut learner = Learner::new(cfg);
        let actual = ev(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14]);
        learner.observe(&actual, &actual);
        // C(14,3) = 364 candidate triplets, pruned down to 10
        let mut kept = 0;
        for a in 1..=14u8 {
            for b in (a + 1)..=14 {
                for c in (b + 1)..=14 {
                    if learner.store().triplet_weight(a, b, c) > 0.0 {
                        kept += 1;
                    }
                }
            }
        }
        assert_eq!(kept, 10);
    }
}
