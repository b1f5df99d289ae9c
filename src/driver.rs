//! 浏览器驱动：把会话的虚拟时钟对齐到真实时间，并用定时器触发到期任务。

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::future::TimeoutFuture;
use log::warn;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys::{Date, Function};

use crate::display::{DisplayRelay, DisplaySink};
use crate::game::{GameEvent, GameSession, GameSummary};

#[derive(Debug, Clone, Copy)]
struct WasmInstant {
    timestamp: f64,
}

impl WasmInstant {
    fn now() -> Self {
        Self {
            timestamp: Date::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        let elapsed_ms = (Date::now() - self.timestamp).max(0.0);
        Duration::from_millis(elapsed_ms as u64)
    }
}

impl std::ops::Add<Duration> for WasmInstant {
    type Output = WasmInstant;

    fn add(self, duration: Duration) -> Self::Output {
        Self {
            timestamp: self.timestamp + duration.as_millis() as f64,
        }
    }
}

/// 把显示事件转交给前端传入的 JS 回调。
#[derive(Default)]
pub struct JsDisplay {
    on_progress: Option<Function>,
    on_victory: Option<Function>,
}

impl JsDisplay {
    pub fn new(on_progress: Option<Function>, on_victory: Option<Function>) -> Self {
        Self {
            on_progress,
            on_victory,
        }
    }
}

impl DisplaySink for JsDisplay {
    fn show_progress(&mut self, moves: u32, seconds: u32) {
        let Some(callback) = &self.on_progress else {
            return;
        };
        if let Err(error) =
            callback.call2(&JsValue::NULL, &JsValue::from(moves), &JsValue::from(seconds))
        {
            warn!("onProgress callback failed: {error:?}");
        }
    }

    fn show_victory(&mut self, summary: &GameSummary) {
        let Some(callback) = &self.on_victory else {
            return;
        };
        let value = match serde_wasm_bindgen::to_value(summary) {
            Ok(value) => value,
            Err(error) => {
                warn!("failed to serialize summary: {error}");
                return;
            }
        };
        if let Err(error) = callback.call1(&JsValue::NULL, &value) {
            warn!("onVictory callback failed: {error:?}");
        }
    }
}

struct Shared {
    session: RefCell<GameSession>,
    display: DisplayRelay<JsDisplay>,
    last_sync: Cell<WasmInstant>,
    generation: Cell<u64>,
}

impl Shared {
    /// 把虚拟时钟追到当前真实时间，返回期间触发的事件。
    fn catch_up(&self) -> Vec<GameEvent> {
        let last_sync = self.last_sync.get();
        let elapsed = last_sync.elapsed();
        // 只前移整毫秒，避免截断误差累积。
        self.last_sync
            .set(last_sync + Duration::from_millis(elapsed.as_millis() as u64));
        self.session
            .borrow_mut()
            .advance(elapsed.as_millis() as u64)
    }
}

/// 同一时刻只保留一个有效的定时器，过期的定时器靠代数号识别并丢弃。
fn arm(shared: &Rc<Shared>) {
    let generation = shared.generation.get().wrapping_add(1);
    shared.generation.set(generation);

    let Some(delay) = shared.session.borrow().next_due_in() else {
        return;
    };
    let delay = u32::try_from(delay).unwrap_or(u32::MAX);
    let shared = Rc::clone(shared);
    spawn_local(async move {
        TimeoutFuture::new(delay).await;
        if shared.generation.get() != generation {
            return;
        }
        let events = shared.catch_up();
        shared.display.publish(&events);
        arm(&shared);
    });
}

pub struct Driver {
    shared: Rc<Shared>,
}

impl Driver {
    pub fn new(session: GameSession, display: JsDisplay) -> Self {
        Self {
            shared: Rc::new(Shared {
                session: RefCell::new(session),
                display: DisplayRelay::new(display),
                last_sync: Cell::new(WasmInstant::now()),
                generation: Cell::new(0),
            }),
        }
    }

    pub fn session(&self) -> Ref<'_, GameSession> {
        self.shared.session.borrow()
    }

    /// 先追平时钟，再执行操作，随后发布事件并重新布置定时器。
    pub fn apply<F>(&self, action: F) -> Vec<GameEvent>
    where
        F: FnOnce(&mut GameSession) -> Vec<GameEvent>,
    {
        let mut events = self.shared.catch_up();
        let mut produced = {
            let mut session = self.shared.session.borrow_mut();
            action(&mut *session)
        };
        events.append(&mut produced);
        self.shared.display.publish(&events);
        arm(&self.shared);
        events
    }
}
