use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::Symbol;

pub const DEFAULT_DIMENSION: usize = 4;
pub const DEFAULT_TICK_MS: u32 = 1_000;
pub const DEFAULT_REVEAL_DELAY_MS: u32 = 1_000;

/// 默认符号池，共十个。
pub const DEFAULT_SYMBOLS: [&str; 10] = [
    "🥔", "🍒", "🥑", "🌽", "🥕", "🍇", "🍉", "🍌", "🥭", "🍍",
];

/// 会话构建阶段的配置错误。会话一旦建立便不再产生错误。
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ConfigError {
    #[error("board dimension must be a positive even number, got 0")]
    ZeroDimension,
    #[error("board dimension must be an even number, got {dimension}")]
    OddDimension { dimension: usize },
    #[error("symbol pool has {available} symbols but the board needs {required} pairs")]
    InsufficientSymbols { required: usize, available: usize },
    #[error("symbol pool contains {symbol} more than once")]
    DuplicateSymbol { symbol: Symbol },
    #[error("deal has {actual} cards but the board needs {expected}")]
    DealSizeMismatch { expected: usize, actual: usize },
    #[error("symbol {symbol} appears {count} times in the deal, expected exactly 2")]
    UnpairedSymbol { symbol: Symbol, count: usize },
    #[error("tick period must be greater than zero")]
    ZeroTickPeriod,
    #[error("reveal delay must be greater than zero")]
    ZeroRevealDelay,
}

/// 棋盘边长必须为正偶数，否则无法两两配对。
pub fn validate_dimension(dimension: usize) -> Result<(), ConfigError> {
    if dimension == 0 {
        return Err(ConfigError::ZeroDimension);
    }
    if dimension % 2 != 0 {
        return Err(ConfigError::OddDimension { dimension });
    }
    Ok(())
}

pub fn default_symbols() -> Vec<Symbol> {
    DEFAULT_SYMBOLS.iter().map(|symbol| symbol.to_string()).collect()
}

/// 一局游戏的全部外部参数。所有字段都有默认值，前端可以只传 `dimension`。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub dimension: usize,
    pub symbols: Vec<Symbol>,
    pub tick_ms: u32,
    pub reveal_delay_ms: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_timing(mut self, tick_ms: u32, reveal_delay_ms: u32) -> Self {
        self.tick_ms = tick_ms;
        self.reveal_delay_ms = reveal_delay_ms;
        self
    }

    pub fn card_count(&self) -> usize {
        self.dimension * self.dimension
    }

    pub fn pair_count(&self) -> usize {
        self.card_count() / 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dimension(self.dimension)?;

        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if !seen.insert(symbol) {
                return Err(ConfigError::DuplicateSymbol {
                    symbol: symbol.clone(),
                });
            }
        }
        if self.pair_count() > self.symbols.len() {
            return Err(ConfigError::InsufficientSymbols {
                required: self.pair_count(),
                available: self.symbols.len(),
            });
        }

        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.reveal_delay_ms == 0 {
            return Err(ConfigError::ZeroRevealDelay);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            symbols: default_symbols(),
            tick_ms: DEFAULT_TICK_MS,
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            seed: None,
        }
    }
}
