//! 游戏核心逻辑模块（发牌、状态机、计时调度等）。

pub mod config;
pub mod deck;
pub mod schedule;
pub mod session;
pub mod state;

pub use config::{
    default_symbols,
    ConfigError,
    GameConfig,
    DEFAULT_DIMENSION,
    DEFAULT_REVEAL_DELAY_MS,
    DEFAULT_SYMBOLS,
    DEFAULT_TICK_MS,
};
pub use deck::{build_deal, select_symbols, shuffle};
pub use schedule::{Scheduler, TaskKind, TimerHandle};
pub use session::{GameSession, SessionResolution, SessionSnapshot};
pub use state::{
    Board,
    Card,
    CardPosition,
    CardStatus,
    GameEvent,
    GameSummary,
    SessionPhase,
    Symbol,
};
