//! 渲染层接口：计分显示与棋盘渲染。

use std::cell::{Ref, RefCell};

use crate::game::{CardPosition, CardStatus, GameEvent, GameSummary, Symbol};

/// 接收步数/时间和最终成绩的显示端。
pub trait DisplaySink {
    fn show_progress(&mut self, moves: u32, seconds: u32);
    fn show_victory(&mut self, summary: &GameSummary);
}

/// 负责把卡牌画出来的渲染端。
pub trait BoardRenderer {
    /// 按 `dimension` 列的网格为每个符号建立一张卡牌。
    fn build(&mut self, dimension: usize, symbols: &[Symbol]);
    fn set_status(&mut self, position: CardPosition, status: CardStatus);
}

pub fn moves_label(moves: u32) -> String {
    format!("{moves} moves")
}

pub fn timer_label(seconds: u32) -> String {
    format!("time: {seconds} sec")
}

pub fn victory_banner(summary: &GameSummary) -> String {
    format!(
        "You won!\nwith {} moves\nunder {} seconds",
        summary.moves, summary.seconds
    )
}

/// 把事件中的计时和胜利信息转发给显示端。
pub fn publish<S: DisplaySink + ?Sized>(events: &[GameEvent], sink: &mut S) {
    for event in events {
        match event {
            GameEvent::Tick { moves, seconds } => sink.show_progress(*moves, *seconds),
            GameEvent::GameWon { summary } => sink.show_victory(summary),
            _ => {}
        }
    }
}

/// 包装一个显示端，允许显示回调再次触发发布。
///
/// 显示端正忙时新事件先进入队列，由外层的发布调用在返回前按顺序送出。
pub struct DisplayRelay<S> {
    sink: RefCell<S>,
    pending: RefCell<Vec<GameEvent>>,
}

impl<S: DisplaySink> DisplayRelay<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: RefCell::new(sink),
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn publish(&self, events: &[GameEvent]) {
        self.pending.borrow_mut().extend_from_slice(events);
        let Ok(mut sink) = self.sink.try_borrow_mut() else {
            return;
        };
        loop {
            let batch = std::mem::take(&mut *self.pending.borrow_mut());
            if batch.is_empty() {
                break;
            }
            publish(&batch, &mut *sink);
        }
    }

    pub fn sink(&self) -> Ref<'_, S> {
        self.sink.borrow()
    }
}

/// 把事件翻译成卡牌状态变化。
pub fn sync_board<R: BoardRenderer + ?Sized>(events: &[GameEvent], renderer: &mut R) {
    for event in events {
        match event {
            GameEvent::CardRevealed { position, .. } => {
                renderer.set_status(*position, CardStatus::FaceUp)
            }
            GameEvent::PairMatched { first, second } => {
                renderer.set_status(*first, CardStatus::Matched);
                renderer.set_status(*second, CardStatus::Matched);
            }
            GameEvent::CardsHidden { positions } => {
                for position in positions {
                    renderer.set_status(*position, CardStatus::FaceDown);
                }
            }
            _ => {}
        }
    }
}

/// 纯文本显示端，保存当前的三段文字。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDisplay {
    pub moves: String,
    pub timer: String,
    pub banner: Option<String>,
}

impl TextDisplay {
    pub fn new() -> Self {
        Self {
            moves: moves_label(0),
            timer: timer_label(0),
            banner: None,
        }
    }
}

impl Default for TextDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for TextDisplay {
    fn show_progress(&mut self, moves: u32, seconds: u32) {
        self.moves = moves_label(moves);
        self.timer = timer_label(seconds);
    }

    fn show_victory(&mut self, summary: &GameSummary) {
        self.show_progress(summary.moves, summary.seconds);
        self.banner = Some(victory_banner(summary));
    }
}
