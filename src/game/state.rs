use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::config::{validate_dimension, ConfigError};

/// 卡牌上的符号，相等即配对。
pub type Symbol = String;
/// 卡牌在棋盘上的位置（行优先）。
pub type CardPosition = usize;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardStatus {
    FaceDown,
    FaceUp,
    Matched,
}

impl Default for CardStatus {
    fn default() -> Self {
        CardStatus::FaceDown
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub position: CardPosition,
    pub symbol: Symbol,
    #[serde(default)]
    pub status: CardStatus,
}

impl Card {
    pub fn new(position: CardPosition, symbol: impl Into<Symbol>) -> Self {
        Self {
            position,
            symbol: symbol.into(),
            status: CardStatus::FaceDown,
        }
    }

    pub fn is_face_down(&self) -> bool {
        self.status == CardStatus::FaceDown
    }

    pub fn is_face_up(&self) -> bool {
        self.status == CardStatus::FaceUp
    }

    pub fn is_matched(&self) -> bool {
        self.status == CardStatus::Matched
    }
}

/// 会话阶段：Idle → Running → Won。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
    Won,
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSummary {
    pub moves: u32,
    pub seconds: u32,
}

/// 会话事件流，按发生顺序交给渲染层。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    SessionStarted,
    CardRevealed {
        position: CardPosition,
        symbol: Symbol,
    },
    FlipDiscarded {
        position: CardPosition,
    },
    PairMatched {
        first: CardPosition,
        second: CardPosition,
    },
    PairMismatched {
        first: CardPosition,
        second: CardPosition,
    },
    CardsHidden {
        positions: Vec<CardPosition>,
    },
    Tick {
        moves: u32,
        seconds: u32,
    },
    GameWon {
        summary: GameSummary,
    },
}

/// 棋盘：结构在会话期间不变，只有卡牌状态会变化。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    dimension: usize,
    cards: Vec<Card>,
}

impl Board {
    /// 由发牌结果建立棋盘，并校验每个符号恰好出现两次。
    pub fn from_deal(dimension: usize, deal: Vec<Symbol>) -> Result<Self, ConfigError> {
        validate_dimension(dimension)?;
        let expected = dimension * dimension;
        if deal.len() != expected {
            return Err(ConfigError::DealSizeMismatch {
                expected,
                actual: deal.len(),
            });
        }

        let mut counts: HashMap<&Symbol, usize> = HashMap::new();
        for symbol in &deal {
            *counts.entry(symbol).or_default() += 1;
        }
        // 按发牌顺序报告第一个不成对的符号，保证错误信息稳定。
        if let Some(symbol) = deal.iter().find(|symbol| counts[symbol] != 2) {
            return Err(ConfigError::UnpairedSymbol {
                symbol: symbol.clone(),
                count: counts[symbol],
            });
        }

        let cards = deal
            .into_iter()
            .enumerate()
            .map(|(position, symbol)| Card::new(position, symbol))
            .collect();
        Ok(Self { dimension, cards })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, position: CardPosition) -> Option<&Card> {
        self.cards.get(position)
    }

    pub(crate) fn card_mut(&mut self, position: CardPosition) -> Option<&mut Card> {
        self.cards.get_mut(position)
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.cards.iter().map(|card| card.symbol.clone()).collect()
    }

    pub fn positions_with(&self, status: CardStatus) -> Vec<CardPosition> {
        self.cards
            .iter()
            .filter(|card| card.status == status)
            .map(|card| card.position)
            .collect()
    }

    pub fn all_matched(&self) -> bool {
        self.cards.iter().all(Card::is_matched)
    }

    /// 把所有未配对的正面牌翻回背面，返回被翻回的位置。
    pub(crate) fn hide_unmatched(&mut self) -> Vec<CardPosition> {
        let mut hidden = Vec::new();
        for card in &mut self.cards {
            if card.is_face_up() {
                card.status = CardStatus::FaceDown;
                hidden.push(card.position);
            }
        }
        hidden
    }
}
