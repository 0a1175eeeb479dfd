//! Stochastic candidate generation biased by the learned weights.
//!
//! Weighted sampling without replacement: each draw picks one number with
//! probability proportional to its composite weight (base weight × hot /
//! cold / critical membership boosts), removes it from the pool, and
//! repeats until the event is full.
//!
//! This is the only place in the engine that touches the RNG. Given the
//! same seed, weight snapshot, and recency window, the generated pool is
//! bit-for-bit identical - the property every reproducibility guarantee in
//! the system rests on.
//!
//! With an empty weight store every number sits at the floor weight, which
//! makes the draw exactly uniform - the cold-start fallback.

use rand::Rng;

use crate::model::{RecencyWindow, WeightStore};
use crate::types::{EngineConfig, Event, Number};

/// Draw one event of `config.event_size` distinct numbers.
pub fn draw_event<R: Rng>(
    store: &WeightStore,
    recency: &RecencyWindow,
    config: &EngineConfig,
    rng: &mut R,
) -> Event {
    // Remaining pool and its composite weights; chosen entries are removed.
    let mut pool: Vec<Number> = (1..=config.domain_size).collect();
    let mut weights: Vec<f64> = pool
        .iter()
        .map(|&n| store.draw_weight(n, recency, config))
        .collect();

    let mut numbers = Vec::with_capacity(config.event_size);
    for _ in 0..config.event_size {
        let total: f64 = weights.iter().sum();
        let idx = if total > 0.0 {
            // Walk the cumulative mass; the final clamp guards against
            // floating-point shortfall at the very end of the walk.
            let target = rng.gen::<f64>() * total;
            let mut acc = 0.0;
            let mut chosen = weights.len() - 1;
            for (i, &w) in weights.iter().enumerate() {
                acc += w;
                if target < acc {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            // Degenerate all-zero mass: uniform over the remainder
            rng.gen_range(0..pool.len())
        };
        numbers.push(pool.swap_remove(idx));
        weights.swap_remove(idx);
    }

    numbers.sort_unstable();
    Event::from_sorted(numbers)
}

/// Generate a pool of candidate events. Duplicates across the pool are
/// permitted; scoring treats them independently.
pub fn generate<R: Rng>(
    store: &WeightStore,
    recency: &RecencyWindow,
    config: &EngineConfig,
    rng: &mut R,
    pool_size: usize,
) -> Vec<Event> {
    (0..pool_size)
        .map(|_| draw_event(store, recency, config, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn empty_parts(config: &EngineConfig) -> (WeightStore, RecencyWindow) {
        (
            WeightStore::new(config.domain_size, config.weight_cap),
            RecencyWindow::default(),
        )
    }

    #[test]
    fn test_every_draw_is_a_valid_event() {
        let config = EngineConfig::default();
        let (store, recency) = empty_parts(&config);
        let mut rng = StdRng::seed_from_u64(7);
        for event in generate(&store, &recency, &config, &mut rng, 200) {
            assert_eq!(event.len(), config.event_size);
            let numbers = event.numbers();
            assert!(numbers.windows(2).all(|w| w[0] < w[1]), "sorted, distinct");
            assert!(numbers.iter().all(|&n| (1..=config.domain_size).contains(&n)));
        }
    }

    #[test]
    fn test_same_seed_same_pool() {
        let config = EngineConfig::default();
        let mut store = WeightStore::new(config.domain_size, config.weight_cap);
        let probe = Event::new(vec![1, 5, 9, 13], 25, 4).unwrap();
        store.update_singles(&probe, 20.0);
        let recency = RecencyWindow::default();

        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        let pool_a = generate(&store, &recency, &config, &mut rng_a, 50);
        let pool_b = generate(&store, &recency, &config, &mut rng_b, 50);
        assert_eq!(pool_a, pool_b);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let config = EngineConfig::default();
        let (store, recency) = empty_parts(&config);
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(2);
        let pool_a = generate(&store, &recency, &config, &mut rng_a, 20);
        let pool_b = generate(&store, &recency, &config, &mut rng_b, 20);
        assert_ne!(pool_a, pool_b);
    }

    #[test]
    fn test_heavy_numbers_dominate_draws() {
        let config = EngineConfig::default();
        let mut store = WeightStore::new(config.domain_size, config.weight_cap);
        // 14 numbers at the cap vs 11 at the floor: draws should almost
        // always return exactly the heavy set.
        let heavy = Event::new((1..=14).collect(), 25, 14).unwrap();
        store.update_singles(&heavy, config.weight_cap);
        let recency = RecencyWindow::default();
        let mut rng = StdRng::seed_from_u64(3);

        let pool = generate(&store, &recency, &config, &mut rng, 100);
        let exact = pool.iter().filter(|e| e.overlap(&heavy) == 14).count();
        assert!(exact > 90, "only {} of 100 draws hit the heavy set", exact);
    }

    #[test]
    fn test_empty_store_samples_uniformly() {
        // Cold start: every number at the floor weight. Over many draws
        // each number should appear roughly event_size/domain_size of the
        // time (14/25 = 56%).
        let config = EngineConfig::default();
        let (store, recency) = empty_parts(&config);
        let mut rng = StdRng::seed_from_u64(11);
        let pool = generate(&store, &recency, &config, &mut rng, 500);

        let mut counts = [0usize; 26];
        for event in &pool {
            for &n in event.numbers() {
                counts[n as usize] += 1;
            }
        }
        let expected = 500.0 * 14.0 / 25.0;
        for n in 1..=25 {
            let deviation = (counts[n] as f64 - expected).abs() / expected;
            assert!(
                deviation < 0.15,
                "number {} drawn {} times, expected ~{}",
                n,
                counts[n],
                expected
            );
        }
    }

    #[test]
    fn test_full_domain_draw_takes_everything() {
        // event_size == domain_size leaves nothing to chance
        let config = EngineConfig {
            domain_size: 5,
            event_size: 5,
            cold_count: 0,
            hot_count: 0,
            local_search_k: 1,
            ..EngineConfig::default()
        };
        let (store, recency) = empty_parts(&config);
        let mut rng = StdRng::seed_from_u64(5);
        let event = draw_event(&store, &recency, &config, &mut rng);
        assert_eq!(event.numbers(), &[1, 2, 3, 4, 5]);
    }
}
