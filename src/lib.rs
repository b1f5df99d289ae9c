pub mod display;
pub mod game;
pub mod input;
pub mod logging;

mod driver;

use log::LevelFilter;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use web_sys::js_sys::Function;

pub use display::{
    moves_label, publish, sync_board, timer_label, victory_banner, BoardRenderer, DisplayRelay,
    DisplaySink, TextDisplay,
};
pub use game::{
    build_deal, default_symbols, select_symbols, shuffle, Board, Card, CardPosition, CardStatus,
    ConfigError, GameConfig, GameEvent, GameSession, GameSummary, SessionPhase, SessionResolution,
    SessionSnapshot, Symbol,
};
pub use input::{dispatch, start_enabled, InputTarget};

use driver::{Driver, JsDisplay};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    logging::init(LevelFilter::Info);
}

#[derive(Serialize)]
struct JsConfigError<'a> {
    message: String,
    #[serde(flatten)]
    error: &'a ConfigError,
}

fn to_js_error(error: ConfigError) -> JsValue {
    let payload = JsConfigError {
        message: error.to_string(),
        error: &error,
    };
    // flatten 会走 map 序列化，需要输出普通对象而不是 Map。
    payload
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn is_absent(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

fn config_from_js(value: JsValue) -> Result<GameConfig, JsValue> {
    if is_absent(&value) {
        return Ok(GameConfig::default());
    }
    from_value(value).map_err(JsValue::from)
}

/// 浏览器中的一局翻牌配对游戏。
#[wasm_bindgen]
pub struct MemoryGame {
    driver: Driver,
}

#[wasm_bindgen]
impl MemoryGame {
    /// `config` 可省略；`onProgress(moves, seconds)` 每秒调用，`onVictory(summary)` 在胜利时调用。
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        on_progress: Option<Function>,
        on_victory: Option<Function>,
    ) -> Result<MemoryGame, JsValue> {
        let config = config_from_js(config)?;
        let session = GameSession::new(config).map_err(to_js_error)?;
        let display = JsDisplay::new(on_progress, on_victory);
        Ok(MemoryGame {
            driver: Driver::new(session, display),
        })
    }

    pub fn dimension(&self) -> usize {
        self.driver.session().board().dimension()
    }

    /// 每个位置上的符号，渲染层据此建立卡牌网格。
    pub fn deal(&self) -> Result<JsValue, JsValue> {
        to_value(&self.driver.session().board().symbols()).map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = "isWon")]
    pub fn is_won(&self) -> bool {
        self.driver.session().is_won()
    }

    #[wasm_bindgen(js_name = "startEnabled")]
    pub fn start_enabled(&self) -> bool {
        input::start_enabled(&self.driver.session())
    }

    #[wasm_bindgen(js_name = "stateJson")]
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.driver.session().snapshot()).map_err(serde_to_js_error)
    }

    pub fn start(&self) -> Result<String, JsValue> {
        self.run(|session| session.start())
    }

    pub fn flip(&self, position: usize) -> Result<String, JsValue> {
        self.run(|session| session.flip(position))
    }

    #[wasm_bindgen(js_name = "clickCard")]
    pub fn click_card(&self, position: usize) -> Result<String, JsValue> {
        self.run(|session| dispatch(session, InputTarget::Card { position }))
    }

    #[wasm_bindgen(js_name = "clickStart")]
    pub fn click_start(&self) -> Result<String, JsValue> {
        self.run(|session| dispatch(session, InputTarget::StartButton))
    }

    /// 在真实时间之外额外推进虚拟时钟。
    pub fn advance(&self, elapsed_ms: u32) -> Result<String, JsValue> {
        self.run(|session| session.advance(u64::from(elapsed_ms)))
    }

    fn run<F>(&self, action: F) -> Result<String, JsValue>
    where
        F: FnOnce(&mut GameSession) -> Vec<GameEvent>,
    {
        let events = self.driver.apply(action);
        let resolution = SessionResolution::new(&self.driver.session(), events);
        serde_json::to_string(&resolution).map_err(serde_to_js_error)
    }
}

/// 生成一份发牌结果；`symbols` 省略时使用默认符号池。
#[wasm_bindgen(js_name = "buildDeal")]
pub fn build_deal_js(dimension: usize, symbols: JsValue) -> Result<JsValue, JsValue> {
    let pool: Vec<Symbol> = if is_absent(&symbols) {
        default_symbols()
    } else {
        from_value(symbols).map_err(JsValue::from)?
    };
    let mut rng = SmallRng::from_entropy();
    let deal = build_deal(dimension, &pool, &mut rng).map_err(to_js_error)?;
    to_value(&deal).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "defaultSymbols")]
pub fn default_symbols_js() -> Result<JsValue, JsValue> {
    to_value(&default_symbols()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "setLogLevel")]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = logging::parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("unknown log level: {level}")))?;
    logging::init(filter);
    Ok(())
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
