//! Replay evaluation metrics - how close did the prediction come?
//!
//! The only honest way to grade this system is against held-out history:
//! train on a prefix of the stream, predict, and count how many numbers of
//! each held-out series the prediction actually hit. A series is graded by
//! its *best* event overlap - one draw cycle contains seven events and
//! matching any of them is the success the search optimizes toward.
//!
//! Aggregation reports mean, standard deviation, and max so a single lucky
//! series cannot masquerade as model quality.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::search::EnsembleDriver;
use crate::types::{EngineConfig, Event, Series};

use super::stream::TrainingStream;

/// Outcome of grading one prediction against one held-out series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesOutcome {
    pub series_id: u64,
    /// Best overlap between the prediction and any event in the series.
    pub best_overlap: usize,
    /// True when some event was matched exactly.
    pub exact: bool,
}

impl SeriesOutcome {
    /// Grade a prediction against every event of a series.
    pub fn measure(prediction: &Event, series: &Series) -> Self {
        let best_overlap = series
            .events()
            .iter()
            .map(|event| prediction.overlap(event))
            .max()
            .unwrap_or(0);
        Self {
            series_id: series.id(),
            best_overlap,
            exact: best_overlap == prediction.len(),
        }
    }
}

/// Aggregated replay metrics over a set of held-out series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayReport {
    pub mean_best_overlap: f64,
    pub std_best_overlap: f64,
    pub max_best_overlap: usize,
    pub exact_matches: usize,
    pub n_series: usize,
    pub outcomes: Vec<SeriesOutcome>,
}

impl ReplayReport {
    /// Aggregate per-series outcomes into summary statistics.
    pub fn aggregate(outcomes: Vec<SeriesOutcome>) -> Self {
        if outcomes.is_empty() {
            return Self::default();
        }
        let overlaps: Vec<f64> = outcomes.iter().map(|o| o.best_overlap as f64).collect();
        Self {
            mean_best_overlap: mean(&overlaps),
            std_best_overlap: std_dev(&overlaps),
            max_best_overlap: outcomes.iter().map(|o| o.best_overlap).max().unwrap_or(0),
            exact_matches: outcomes.iter().filter(|o| o.exact).count(),
            n_series: outcomes.len(),
            outcomes,
        }
    }
}

/// Train on the stream minus the last `holdout` series, predict with the
/// full ensemble, and grade the top candidate against each held-out series.
pub fn backtest(
    stream: &TrainingStream,
    holdout: usize,
    config: &EngineConfig,
) -> Result<ReplayReport, EngineError> {
    if holdout == 0 || holdout >= stream.len() {
        return Err(EngineError::InvalidConfig(format!(
            "holdout {} must be in [1, {})",
            holdout,
            stream.len()
        )));
    }
    let split = stream.len() - holdout;
    let prefix = stream.truncated(split);

    let driver = EnsembleDriver::new(config.clone())?;
    let result = driver.run(&prefix)?;
    let top = result.top().ok_or(EngineError::EmptyResult)?;

    let outcomes = stream.series()[split..]
        .iter()
        .map(|series| SeriesOutcome::measure(&top.event, series))
        .collect();
    Ok(ReplayReport::aggregate(outcomes))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
