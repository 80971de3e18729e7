pub mod ai;
pub mod game;
#[macro_use]
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{AiAgent, AiDecision, AiDifficulty, MoveReason};
pub use game::{
    Board, GameEvent, GameOutcome, GameSession, IntegrityError, Mark, MoveError, MoveOutcome,
    MoveResolution, Opponent, Seat, SessionConfig, SetupError, Turn, WinPattern, AI_NAME,
    WIN_PATTERNS,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error<E: Serialize>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn make_resolution_json(resolution: MoveResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

fn parse_difficulty(value: Option<&str>) -> AiDifficulty {
    value
        .and_then(|value| AiDifficulty::from_str(value).ok())
        .unwrap_or_default()
}

fn make_rng(seed: Option<u32>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(u64::from(seed)),
        None => SmallRng::from_entropy(),
    }
}

fn board_from_js(board: JsValue) -> Result<Board, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    board.integrity_check().map_err(to_js_error)?;
    Ok(board)
}

fn log_outcome(outcome: &MoveOutcome) {
    match outcome {
        MoveOutcome::Rejected { reason } => console_log!("move rejected: {reason}"),
        _ => {
            if let Some(banner) = outcome.banner() {
                console_log!("{banner}");
            }
        }
    }
}

/// 前端持有的对局句柄，内部保存会话和随机源。
#[wasm_bindgen]
pub struct TicTacToe {
    session: GameSession,
    rng: SmallRng,
}

#[wasm_bindgen]
impl TicTacToe {
    /// 传入 `seed` 可以复现 AI 的随机落子。
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u32>) -> TicTacToe {
        TicTacToe {
            session: GameSession::new(),
            rng: make_rng(seed),
        }
    }

    /// 不传 `player_two` 即与 AI 对战。
    pub fn start(
        &mut self,
        player_one: String,
        player_two: Option<String>,
        difficulty: Option<String>,
    ) -> Result<String, JsValue> {
        let config = match player_two {
            Some(name) => SessionConfig::versus_human(player_one, name),
            None => SessionConfig::versus_ai(player_one, parse_difficulty(difficulty.as_deref())),
        };
        self.begin(config)
    }

    pub fn start_json(&mut self, config_json: &str) -> Result<String, JsValue> {
        let config: SessionConfig = serde_json::from_str(config_json).map_err(serde_to_js_error)?;
        self.begin(config)
    }

    pub fn submit_move(&mut self, cell: usize) -> Result<String, JsValue> {
        let from = self.session.event_log.len();
        let outcome = self.session.submit_move(cell, &mut self.rng);
        log_outcome(&outcome);
        make_resolution_json(MoveResolution::new(outcome, &self.session, from))
    }

    pub fn reset(&mut self, restart_only: bool) -> Result<String, JsValue> {
        self.session.reset(restart_only, &mut self.rng);
        console_log!(
            "session reset (restart_only = {restart_only}), turn: {:?}",
            self.session.turn
        );
        make_resolution_json(MoveResolution::new(
            MoveOutcome::Continued,
            &self.session,
            0,
        ))
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let session: GameSession = serde_json::from_str(json).map_err(serde_to_js_error)?;
        session.integrity_check().map_err(|error| {
            console_log!("snapshot rejected: {error}");
            to_js_error(error)
        })?;
        self.session = session;
        Ok(())
    }

    pub fn board(&self) -> Result<JsValue, JsValue> {
        to_value(&self.session.board).map_err(JsValue::from)
    }

    /// 为当前行棋方（人机对局中即人类玩家）按会话难度给出建议落子，可选延迟；不会修改会话。
    ///
    /// 种子取自实例的随机源，同一 `seed` 构造的实例给出相同建议。
    pub fn think_ai(&mut self, delay_ms: Option<u32>) -> Promise {
        let board = self.session.board;
        let seat = self.session.turn.seat();
        let difficulty = self.session.ai_difficulty.unwrap_or_default();
        let delay = delay_ms.unwrap_or(0);
        let seed: u64 = self.rng.gen();

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let decision = match seat {
                Some(seat) => AiAgent::with_seed(difficulty, seed).decide_move(&board, seat.mark()),
                None => AiDecision {
                    cell: None,
                    reason: None,
                    difficulty,
                },
            };
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    fn begin(&mut self, config: SessionConfig) -> Result<String, JsValue> {
        self.session
            .begin(config, &mut self.rng)
            .map_err(|error| {
                console_log!("session not started: {error}");
                to_js_error(error)
            })?;
        console_log!(
            "session started: {} vs {}, first turn {:?}",
            self.session.player_one,
            self.session.player_two,
            self.session.turn
        );
        make_resolution_json(MoveResolution::new(
            MoveOutcome::Continued,
            &self.session,
            0,
        ))
    }
}

/// 返回第一条获胜连线，没有则返回 `undefined`。
#[wasm_bindgen(js_name = "checkWinner")]
pub fn check_winner(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.check_winner()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "isDraw")]
pub fn is_draw(board: JsValue) -> Result<bool, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    Ok(board.is_draw())
}

#[wasm_bindgen(js_name = "validateBoard")]
pub fn validate_board(board: JsValue) -> Result<(), JsValue> {
    board_from_js(board).map(|_| ())
}

#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    board: JsValue,
    difficulty: Option<String>,
    mark: Option<String>,
    seed: Option<u32>,
) -> Result<JsValue, JsValue> {
    let board = board_from_js(board)?;
    let difficulty = parse_difficulty(difficulty.as_deref());
    let mark = mark
        .as_deref()
        .and_then(|value| Mark::from_str(value).ok())
        .unwrap_or(Mark::Circle);
    let mut agent = match seed {
        Some(seed) => AiAgent::with_seed(difficulty, u64::from(seed)),
        None => AiAgent::new(difficulty),
    };
    let decision = agent.decide_move(&board, mark);
    to_value(&decision).map_err(JsValue::from)
}
