//! 发牌的性质测试：抽取、洗牌与成对。
#![cfg(not(target_arch = "wasm32"))]

use pairs_game::{build_deal, select_symbols, shuffle, ConfigError};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet};

fn counts<T: Ord + Clone>(items: &[T]) -> BTreeMap<T, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item.clone()).or_insert(0) += 1;
    }
    counts
}

// 互不相同的符号 0..size。
fn pool(size: usize) -> Vec<u16> {
    (0..size as u16).collect()
}

proptest! {
    #[test]
    fn deal_contains_each_pair_exactly_twice(half in 1usize..=4, extra in 0usize..6, seed in any::<u64>()) {
        let dimension = half * 2;
        let pairs = dimension * dimension / 2;
        let pool = pool(pairs + extra);
        let mut rng = SmallRng::seed_from_u64(seed);

        let deal = build_deal(dimension, &pool, &mut rng).expect("pool is large enough");

        prop_assert_eq!(deal.len(), dimension * dimension);
        let counts = counts(&deal);
        prop_assert_eq!(counts.len(), pairs);
        prop_assert!(counts.values().all(|count| *count == 2));
        prop_assert!(counts.keys().all(|symbol| pool.contains(symbol)));
    }

    #[test]
    fn odd_dimensions_never_deal(half in 0usize..5, seed in any::<u64>()) {
        let dimension = half * 2 + 1;
        let pool = pool(64);
        let mut rng = SmallRng::seed_from_u64(seed);

        prop_assert_eq!(
            build_deal(dimension, &pool, &mut rng),
            Err(ConfigError::OddDimension { dimension })
        );
    }

    #[test]
    fn short_pools_never_deal(half in 1usize..=4, missing in 1usize..4, seed in any::<u64>()) {
        let dimension = half * 2;
        let pairs = dimension * dimension / 2;
        let pool = pool(pairs.saturating_sub(missing));
        let mut rng = SmallRng::seed_from_u64(seed);

        let is_short = matches!(
            build_deal(dimension, &pool, &mut rng),
            Err(ConfigError::InsufficientSymbols { .. })
        );
        prop_assert!(is_short);
    }

    #[test]
    fn repeated_symbols_never_deal(half in 1usize..=4, extra in 0usize..6, repeat in any::<prop::sample::Index>(), seed in any::<u64>()) {
        let dimension = half * 2;
        let mut pool = pool(dimension * dimension / 2 + extra);
        let repeated = pool[repeat.index(pool.len())];
        pool.push(repeated);
        let mut rng = SmallRng::seed_from_u64(seed);

        prop_assert_eq!(
            build_deal(dimension, &pool, &mut rng),
            Err(ConfigError::DuplicateSymbol { symbol: repeated.to_string() })
        );
    }

    #[test]
    fn shuffle_is_a_permutation(items in prop::collection::vec(0u8..8, 0..40), seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let shuffled = shuffle(&items, &mut rng);

        prop_assert_eq!(shuffled.len(), items.len());
        prop_assert_eq!(counts(&shuffled), counts(&items));
    }

    #[test]
    fn selection_is_unique_and_in_pool(size in 0usize..30, take in 0usize..30, seed in any::<u64>()) {
        let pool = pool(size);
        let mut rng = SmallRng::seed_from_u64(seed);

        match select_symbols(&pool, take, &mut rng) {
            Ok(picks) => {
                prop_assert!(take <= size);
                prop_assert_eq!(picks.len(), take);
                let unique: BTreeSet<_> = picks.iter().collect();
                prop_assert_eq!(unique.len(), take);
                prop_assert!(picks.iter().all(|pick| pool.contains(pick)));
            }
            Err(error) => {
                prop_assert!(take > size);
                prop_assert_eq!(
                    error,
                    ConfigError::InsufficientSymbols { required: take, available: size }
                );
            }
        }
    }
}
