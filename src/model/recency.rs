//! Cold/hot number derivation from the most recent series.
//!
//! A sliding window over the training stream yields two disjoint signals:
//! - **cold**: the least frequently drawn numbers ("due to reverse")
//! - **hot**: the most frequently drawn numbers ("due to repeat")
//!
//! Tie-breaking is by number ascending in both directions, so the window is
//! fully deterministic for a given stream prefix - a requirement for
//! reproducible generation under a fixed seed.

use crate::types::{Number, Series};

/// Cold and hot number sets derived from the last N series.
///
/// Derived, never owned: recomputed from the stream prefix whenever the
/// learner advances. Holds sorted vectors for binary-search membership.
#[derive(Debug, Clone, Default)]
pub struct RecencyWindow {
    cold: Vec<Number>,
    hot: Vec<Number>,
}

impl RecencyWindow {
    /// Count per-number frequency over the last `window` series and split
    /// out the bottom `cold_count` / top `hot_count` numbers.
    ///
    /// With fewer than `window` series available - including none at all -
    /// the computation degrades gracefully to whatever exists. Over zero
    /// series every count is zero and the split is pure tie-break order.
    pub fn compute(
        series: &[Series],
        domain_size: Number,
        window: usize,
        cold_count: usize,
        hot_count: usize,
    ) -> Self {
        let start = series.len().saturating_sub(window);
        let recent = &series[start..];

        // Zero series: no frequency signal exists, so neither set does.
        // The generator then has no membership boosts to apply and its
        // draws degrade to uniform sampling.
        if recent.is_empty() {
            return Self::default();
        }

        let mut counts: Vec<(usize, Number)> =
            (1..=domain_size).map(|n| (0, n)).collect();
        for s in recent {
            for event in s.events() {
                for &n in event.numbers() {
                    if n >= 1 && n <= domain_size {
                        counts[n as usize - 1].0 += 1;
                    }
                }
            }
        }

        // Cold: lowest counts first, ties by number ascending.
        let mut ascending = counts.clone();
        ascending.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        let mut cold: Vec<Number> = ascending
            .iter()
            .take(cold_count)
            .map(|&(_, n)| n)
            .collect();
        cold.sort_unstable();

        // Hot: highest counts first, ties by number ascending, skipping
        // anything already claimed as cold so the sets stay disjoint.
        let mut descending = counts;
        descending.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        let mut hot: Vec<Number> = descending
            .iter()
            .filter(|&&(_, n)| cold.binary_search(&n).is_err())
            .take(hot_count)
            .map(|&(_, n)| n)
            .collect();
        hot.sort_unstable();

        Self { cold, hot }
    }

    /// Cold numbers, sorted ascending.
    pub fn cold(&self) -> &[Number] {
        &self.cold
    }

    /// Hot numbers, sorted ascending.
    pub fn hot(&self) -> &[Number] {
        &self.hot
    }

    pub fn is_cold(&self, n: Number) -> bool {
        self.cold.binary_search(&n).is_ok()
    }

    pub fn is_hot(&self, n: Number) -> bool {
        self.hot.binary_search(&n).is_ok()
    }
}
