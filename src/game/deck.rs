//! 发牌：从符号池中抽取、成对复制并洗牌。

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use rand::Rng;

use super::config::{validate_dimension, ConfigError};

/// 从 `pool` 中无放回地均匀抽取 `count` 个元素。池中符号必须互不相同。
pub fn select_symbols<T, R>(pool: &[T], count: usize, rng: &mut R) -> Result<Vec<T>, ConfigError>
where
    T: Clone + Eq + Hash + Display,
    R: Rng,
{
    let mut seen = HashSet::with_capacity(pool.len());
    if let Some(repeated) = pool.iter().find(|symbol| !seen.insert(*symbol)) {
        return Err(ConfigError::DuplicateSymbol {
            symbol: repeated.to_string(),
        });
    }
    if count > pool.len() {
        return Err(ConfigError::InsufficientSymbols {
            required: count,
            available: pool.len(),
        });
    }

    let mut remaining = pool.to_vec();
    let mut picks = Vec::with_capacity(count);
    for _ in 0..count {
        let index = rng.gen_range(0..remaining.len());
        picks.push(remaining.swap_remove(index));
    }
    Ok(picks)
}

/// Fisher–Yates 洗牌，返回新序列，不修改输入。
pub fn shuffle<T, R>(sequence: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng,
{
    let mut shuffled = sequence.to_vec();
    for index in (1..shuffled.len()).rev() {
        let other = rng.gen_range(0..=index);
        shuffled.swap(index, other);
    }
    shuffled
}

/// 生成 `dimension * dimension` 张牌的符号排列，每个符号恰好出现两次。
pub fn build_deal<T, R>(dimension: usize, pool: &[T], rng: &mut R) -> Result<Vec<T>, ConfigError>
where
    T: Clone + Eq + Hash + Display,
    R: Rng,
{
    validate_dimension(dimension)?;
    let pair_count = dimension * dimension / 2;
    let picks = select_symbols(pool, pair_count, rng)?;
    let paired: Vec<T> = picks.iter().chain(picks.iter()).cloned().collect();
    Ok(shuffle(&paired, rng))
}
