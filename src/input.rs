//! 点击分发：过滤掉不可交互的目标，再调用会话操作。

use log::debug;
use serde::{Deserialize, Serialize};

use crate::game::{CardPosition, GameEvent, GameSession};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum InputTarget {
    Card { position: CardPosition },
    StartButton,
    Other,
}

/// 开始按钮在会话开始后失效。
pub fn start_enabled(session: &GameSession) -> bool {
    !session.is_started()
}

pub fn dispatch(session: &mut GameSession, target: InputTarget) -> Vec<GameEvent> {
    match target {
        InputTarget::Card { position } => {
            // 胜利后棋盘整体翻面，卡牌不再响应点击。
            if session.is_won() {
                debug!("click on card {position} ignored: board already flipped");
                return Vec::new();
            }
            let face_down = session
                .board()
                .card(position)
                .map(|card| card.is_face_down())
                .unwrap_or(false);
            if !face_down {
                return Vec::new();
            }
            session.flip(position)
        }
        InputTarget::StartButton => {
            if !start_enabled(session) {
                return Vec::new();
            }
            session.start()
        }
        InputTarget::Other => Vec::new(),
    }
}
