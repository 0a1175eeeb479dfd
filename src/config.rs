//! Configuration loading from drawcast.toml.
//!
//! The engine itself takes an [`EngineConfig`] value; this module is the
//! optional file overlay for experimentation without recompiling. Every key
//! is optional and applied over the defaults, so a two-line file tweaking
//! `pool-size` and `num-seeds` is valid.
//!
//! ## Example
//!
//! ```toml
//! recency-window = 10
//! hot-boost = 2.2
//! cold-boost = 1.4
//! critical-policy = "accumulate-decay"
//! num-seeds = 16
//! ```
//!
//! Missing or unreadable files degrade to defaults; a file that parses but
//! contains out-of-range values is rejected by `EngineConfig::validate` at
//! engine construction, not here.

use std::path::Path;

use serde::Deserialize;

use crate::types::{CriticalPolicy, EngineConfig, Number};

/// Filename probed by [`load`].
pub const CONFIG_FILENAME: &str = "drawcast.toml";

/// Raw config as deserialized from TOML. All fields optional.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    domain_size: Option<Number>,
    event_size: Option<usize>,

    recency_window: Option<usize>,
    cold_count: Option<usize>,
    hot_count: Option<usize>,

    hot_boost: Option<f64>,
    cold_boost: Option<f64>,
    critical_boost: Option<f64>,
    pair_multiplier: Option<f64>,
    triplet_multiplier: Option<f64>,

    imbalance_penalty: Option<f64>,
    imbalance_ranges: Option<usize>,

    single_boost: Option<f64>,
    learning_rate: Option<f64>,
    weight_cap: Option<f64>,
    /// Set to 0.0 to disable decay entirely.
    decay_rate: Option<f64>,
    decay_cadence: Option<u64>,
    normalize_weights: Option<bool>,
    max_triplets: Option<usize>,
    critical_policy: Option<CriticalPolicy>,
    critical_decay: Option<f64>,

    pool_size: Option<usize>,
    replay_pool_size: Option<usize>,
    local_search_k: Option<usize>,

    num_seeds: Option<usize>,
    base_seed: Option<u64>,
    top_n: Option<usize>,
    diversity_threshold: Option<f64>,
}

/// Load configuration from the given directory.
///
/// Search order:
/// 1. drawcast.toml in the directory
/// 2. Defaults if the file is absent or unreadable
pub fn load(directory: &Path) -> EngineConfig {
    let path = directory.join(CONFIG_FILENAME);
    if path.exists() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            if let Some(config) = from_toml_str(&content) {
                return config;
            }
        }
    }
    EngineConfig::default()
}

/// Parse a TOML string into a config overlaid on the defaults.
/// Returns `None` on syntax errors or unknown keys.
pub fn from_toml_str(content: &str) -> Option<EngineConfig> {
    let raw: RawConfig = toml::from_str(content).ok()?;
    Some(apply(raw, EngineConfig::default()))
}

fn apply(raw: RawConfig, mut config: EngineConfig) -> EngineConfig {
    macro_rules! overlay {
        ($($field:ident),* $(,)?) => {
            $(if let Some(v) = raw.$field { config.$field = v; })*
        };
    }
    overlay!(
        domain_size,
        event_size,
        recency_window,
        cold_count,
        hot_count,
        hot_boost,
        cold_boost,
        critical_boost,
        pair_multiplier,
        triplet_multiplier,
        imbalance_penalty,
        imbalance_ranges,
        single_boost,
        learning_rate,
        weight_cap,
        decay_cadence,
        normalize_weights,
        critical_policy,
        critical_decay,
        pool_size,
        replay_pool_size,
        local_search_k,
        num_seeds,
        base_seed,
        top_n,
        diversity_threshold,
    );
    // Nullable knobs: 0 means "off" in the file format.
    if let Some(rate) = raw.decay_rate {
        config.decay_rate = if rate == 0.0 { None } else { Some(rate) };
    }
    if let Some(keep) = raw.max_triplets {
        config.max_triplets = if keep == 0 { None } else { Some(keep) };
    }
    config
}

/// Format a config for verbose display.
pub fn display_summary(config: &EngineConfig) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "   Domain: {} of {}",
        config.event_size, config.domain_size
    ));
    lines.push(format!(
        "   Recency: window={} cold={} hot={}",
        config.recency_window, config.cold_count, config.hot_count
    ));
    lines.push(format!(
        "   Ensemble: seeds={} pool={} k={} top={} diversity>={}",
        config.num_seeds,
        config.pool_size,
        config.local_search_k,
        config.top_n,
        config.diversity_threshold
    ));
    match config.decay_rate {
        Some(rate) => lines.push(format!(
            "   Decay: {} every {} steps",
            rate, config.decay_cadence
        )),
        None => lines.push("   Decay: disabled".to_string()),
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overlay_keeps_defaults() {
        let config = from_toml_str("").unwrap();
        let defaults = EngineConfig::default();
        assert_eq!(config.pool_size, defaults.pool_size);
        assert_eq!(config.hot_boost, defaults.hot_boost);
    }

    #[test]
    fn test_partial_overlay() {
        let config = from_toml_str(
            "recency-window = 9\nhot-boost = 2.5\ncritical-policy = \"accumulate-decay\"\n",
        )
        .unwrap();
        assert_eq!(config.recency_window, 9);
        assert_eq!(config.hot_boost, 2.5);
        assert_eq!(config.critical_policy, CriticalPolicy::AccumulateDecay);
        // Untouched keys stay at defaults
        assert_eq!(config.pool_size, EngineConfig::default().pool_size);
    }

    #[test]
    fn test_zero_decay_disables() {
        let config = from_toml_str("decay-rate = 0.0\nmax-triplets = 0\n").unwrap();
        assert_eq!(config.decay_rate, None);
        assert_eq!(config.max_triplets, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(from_toml_str("not-a-knob = 3\n").is_none());
    }

    #[test]
    fn test_missing_directory_gives_defaults() {
        let config = load(Path::new("/nonexistent/nowhere"));
        assert_eq!(config.pool_size, EngineConfig::default().pool_size);
    }

    #[test]
    fn test_display_summary_mentions_decay_state() {
        let mut config = EngineConfig::default();
        assert!(display_summary(&config).contains("Decay: 0.97"));
        config.decay_rate = None;
        assert!(display_summary(&config).contains("Decay: disabled"));
    }
}
