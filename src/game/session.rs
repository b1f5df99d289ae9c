use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{
    config::{ConfigError, GameConfig},
    deck::build_deal,
    schedule::{Scheduler, TaskKind, TimerHandle},
    state::{
        Board, CardPosition, CardStatus, GameEvent, GameSummary, SessionPhase, Symbol,
    },
};

/// 提供给渲染层的会话快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub started: bool,
    pub face_up_count: u32,
    pub total_flips: u32,
    pub elapsed_seconds: u32,
    pub timer_active: bool,
    pub board: Board,
}

/// 一次操作的结果：操作后的快照、产生的事件，以及胜利时的最终成绩。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResolution {
    pub state: SessionSnapshot,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<GameSummary>,
}

impl SessionResolution {
    pub fn new(session: &GameSession, events: Vec<GameEvent>) -> Self {
        Self {
            state: session.snapshot(),
            events,
            summary: session.summary(),
        }
    }
}

/// 翻牌配对游戏的状态机。
///
/// 会话拥有棋盘、计数器和一个虚拟时钟上的任务队列。宿主通过
/// [`GameSession::advance`] 推进时间，周期计时和延迟结算都在其中触发，
/// 因此整个状态机是单线程且可确定性测试的。
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    phase: SessionPhase,
    face_up_count: u32,
    total_flips: u32,
    elapsed_seconds: u32,
    timer: Option<TimerHandle>,
    victory_pending: bool,
    tick_ms: u64,
    reveal_delay_ms: u64,
    scheduler: Scheduler,
    event_log: Vec<GameEvent>,
}

impl GameSession {
    /// 按配置随机发牌。配置中有 `seed` 时结果可复现。
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::with_rng(config, &mut rng)
    }

    pub fn with_rng<R: Rng>(config: GameConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let deal = build_deal(config.dimension, &config.symbols, rng)?;
        Self::from_deal(config, deal)
    }

    /// 使用给定的发牌结果建立会话，忽略配置中的符号池。
    pub fn from_deal(config: GameConfig, deal: Vec<Symbol>) -> Result<Self, ConfigError> {
        if config.tick_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if config.reveal_delay_ms == 0 {
            return Err(ConfigError::ZeroRevealDelay);
        }
        let board = Board::from_deal(config.dimension, deal)?;
        debug!(
            "dealt {} cards on a {}x{} board",
            board.len(),
            board.dimension(),
            board.dimension()
        );

        Ok(Self {
            board,
            phase: SessionPhase::default(),
            face_up_count: 0,
            total_flips: 0,
            elapsed_seconds: 0,
            timer: None,
            victory_pending: false,
            tick_ms: u64::from(config.tick_ms),
            reveal_delay_ms: u64::from(config.reveal_delay_ms),
            scheduler: Scheduler::new(),
            event_log: Vec::new(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    pub fn is_won(&self) -> bool {
        self.phase == SessionPhase::Won
    }

    pub fn face_up_count(&self) -> u32 {
        self.face_up_count
    }

    pub fn total_flips(&self) -> u32 {
        self.total_flips
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn timer_active(&self) -> bool {
        self.timer.is_some()
    }

    pub fn event_log(&self) -> &[GameEvent] {
        &self.event_log
    }

    /// 虚拟时钟的当前时间（毫秒）。
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// 距离下一个待触发任务的毫秒数；没有任务时为 `None`。
    pub fn next_due_in(&self) -> Option<u64> {
        self.scheduler.next_due_in()
    }

    pub fn summary(&self) -> Option<GameSummary> {
        self.is_won().then(|| self.current_summary())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            started: self.is_started(),
            face_up_count: self.face_up_count,
            total_flips: self.total_flips,
            elapsed_seconds: self.elapsed_seconds,
            timer_active: self.timer_active(),
            board: self.board.clone(),
        }
    }

    /// Idle → Running。已开始或已结束时不做任何事。
    pub fn start(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.start_into(&mut events);
        events
    }

    /// 翻开一张背面朝下的牌。对已翻开、已配对、越界的位置以及结束后的调用都是空操作。
    pub fn flip(&mut self, position: CardPosition) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.is_won() {
            debug!("flip({position}) ignored: session already won");
            return events;
        }
        match self.board.card(position) {
            Some(card) if card.is_face_down() => {}
            Some(_) => {
                debug!("flip({position}) ignored: card already revealed");
                return events;
            }
            None => {
                debug!("flip({position}) ignored: no such card");
                return events;
            }
        }

        self.start_into(&mut events);

        // 计数不受两张上限约束：翻牌总会记一步。
        self.total_flips += 1;
        self.face_up_count += 1;

        if self.face_up_count <= 2 {
            if let Some(card) = self.board.card_mut(position) {
                card.status = CardStatus::FaceUp;
                let event = GameEvent::CardRevealed {
                    position,
                    symbol: card.symbol.clone(),
                };
                self.record(&mut events, event);
            }
        } else {
            self.record(&mut events, GameEvent::FlipDiscarded { position });
        }

        if self.face_up_count == 2 {
            self.resolve_turn(&mut events);
        }

        events
    }

    /// 推进虚拟时钟，按到期顺序执行期间的计时和延迟任务。
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<GameEvent> {
        let until = self.scheduler.now().saturating_add(elapsed_ms);
        let mut events = Vec::new();
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task, &mut events);
        }
        self.scheduler.settle(until);
        events
    }

    fn current_summary(&self) -> GameSummary {
        GameSummary {
            moves: self.total_flips,
            seconds: self.elapsed_seconds,
        }
    }

    fn record(&mut self, events: &mut Vec<GameEvent>, event: GameEvent) {
        self.event_log.push(event.clone());
        events.push(event);
    }

    fn start_into(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase != SessionPhase::Idle {
            return;
        }
        self.phase = SessionPhase::Running;
        self.timer = Some(self.scheduler.start_interval(self.tick_ms));
        info!("session started on a {0}x{0} board", self.board.dimension());
        self.record(events, GameEvent::SessionStarted);
    }

    fn resolve_turn(&mut self, events: &mut Vec<GameEvent>) {
        let face_up = self.board.positions_with(CardStatus::FaceUp);
        let [first, second] = face_up[..] else {
            warn!(
                "turn resolution expected two face-up cards, found {}",
                face_up.len()
            );
            return;
        };

        let matched = match (self.board.card(first), self.board.card(second)) {
            (Some(a), Some(b)) => a.symbol == b.symbol,
            _ => false,
        };

        if matched {
            for position in [first, second] {
                if let Some(card) = self.board.card_mut(position) {
                    card.status = CardStatus::Matched;
                }
            }
            self.face_up_count = 0;
            debug!("cards {first} and {second} matched");
            self.record(events, GameEvent::PairMatched { first, second });
            self.check_victory();
        } else {
            debug!("cards {first} and {second} differ; hiding after {}ms", self.reveal_delay_ms);
            self.record(events, GameEvent::PairMismatched { first, second });
            self.scheduler.schedule(self.reveal_delay_ms, TaskKind::HideUnmatched);
        }
    }

    fn check_victory(&mut self) {
        if self.victory_pending || !self.board.all_matched() {
            return;
        }
        self.victory_pending = true;
        self.scheduler.schedule(self.reveal_delay_ms, TaskKind::DeclareVictory);
    }

    fn run_task(&mut self, task: TaskKind, events: &mut Vec<GameEvent>) {
        match task {
            TaskKind::Tick { handle, period } => {
                if self.timer != Some(handle) || self.phase != SessionPhase::Running {
                    return;
                }
                self.elapsed_seconds += 1;
                self.scheduler.schedule(period, TaskKind::Tick { handle, period });
                let event = GameEvent::Tick {
                    moves: self.total_flips,
                    seconds: self.elapsed_seconds,
                };
                self.record(events, event);
            }
            TaskKind::HideUnmatched => {
                let positions = self.board.hide_unmatched();
                self.face_up_count = 0;
                debug!("hid cards {positions:?}");
                self.record(events, GameEvent::CardsHidden { positions });
                self.check_victory();
            }
            TaskKind::DeclareVictory => {
                if self.is_won() {
                    return;
                }
                self.phase = SessionPhase::Won;
                if let Some(handle) = self.timer.take() {
                    self.scheduler.cancel_interval(handle);
                }
                let summary = self.current_summary();
                info!(
                    "game won with {} moves in {} seconds",
                    summary.moves, summary.seconds
                );
                self.record(events, GameEvent::GameWon { summary });
            }
        }
    }
}
