use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::{Board, IntegrityError, Mark, MoveError, WinPattern};
use crate::ai::{select_move, AiDifficulty, MoveReason};

/// 对战 AI 时第二位玩家的显示名。
pub const AI_NAME: &str = "AI";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Seat {
    PlayerOne,
    PlayerTwo,
}

impl Seat {
    /// 标记随座位固定，与谁先手无关。
    pub fn mark(self) -> Mark {
        match self {
            Seat::PlayerOne => Mark::Cross,
            Seat::PlayerTwo => Mark::Circle,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Seat::PlayerOne => Seat::PlayerTwo,
            Seat::PlayerTwo => Seat::PlayerOne,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Seat::PlayerOne => "player one",
            Seat::PlayerTwo => "player two",
        })
    }
}

/// 当前轮到谁；`Paused` 表示对局已结束或尚未开始。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Turn {
    PlayerOne,
    PlayerTwo,
    #[default]
    Paused,
}

impl Turn {
    pub fn next(self) -> Self {
        match self {
            Turn::PlayerOne => Turn::PlayerTwo,
            Turn::PlayerTwo => Turn::PlayerOne,
            Turn::Paused => Turn::Paused,
        }
    }

    pub fn seat(self) -> Option<Seat> {
        match self {
            Turn::PlayerOne => Some(Seat::PlayerOne),
            Turn::PlayerTwo => Some(Seat::PlayerTwo),
            Turn::Paused => None,
        }
    }
}

impl From<Seat> for Turn {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::PlayerOne => Turn::PlayerOne,
            Seat::PlayerTwo => Turn::PlayerTwo,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Opponent {
    Human {
        name: String,
    },
    Ai {
        #[serde(default)]
        difficulty: AiDifficulty,
    },
}

/// 开局配置，前端可以直接以 JSON 形式传入。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub player_one: String,
    pub opponent: Opponent,
}

impl SessionConfig {
    pub fn versus_human(player_one: impl Into<String>, player_two: impl Into<String>) -> Self {
        Self {
            player_one: player_one.into(),
            opponent: Opponent::Human {
                name: player_two.into(),
            },
        }
    }

    pub fn versus_ai(player_one: impl Into<String>, difficulty: AiDifficulty) -> Self {
        Self {
            player_one: player_one.into(),
            opponent: Opponent::Ai { difficulty },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SetupError {
    MissingPlayerName { seat: Seat },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // 与页面的提示一致；座位信息保留在 `seat` 字段里。
            SetupError::MissingPlayerName { .. } => f.write_str("Please enter name."),
        }
    }
}

impl std::error::Error for SetupError {}

/// 对局事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    GameStarted {
        starter: Seat,
    },
    MovePlayed {
        seat: Seat,
        cell: usize,
        mark: Mark,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<MoveReason>,
    },
    GameWon {
        winner: Seat,
        pattern: WinPattern,
    },
    GameDrawn,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameOutcome {
    Won { winner: Seat, pattern: WinPattern },
    Draw,
}

/// 一次落子提交的结果。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MoveOutcome {
    Continued,
    Won { pattern: WinPattern, winner: String },
    Draw,
    Rejected { reason: MoveError },
}

impl MoveOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MoveOutcome::Won { .. } | MoveOutcome::Draw)
    }

    /// 弹窗中显示的文字。
    pub fn banner(&self) -> Option<String> {
        match self {
            MoveOutcome::Won { winner, .. } => Some(format!("{winner} has won")),
            MoveOutcome::Draw => Some("Draw".to_owned()),
            MoveOutcome::Continued | MoveOutcome::Rejected { .. } => None,
        }
    }
}

/// 整个对局会话，包括棋盘、回合、玩家信息与下一局先手。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSession {
    pub board: Board,
    pub turn: Turn,
    #[serde(default)]
    pub player_one: String,
    #[serde(default)]
    pub player_two: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_difficulty: Option<AiDifficulty>,
    pub next_starter: Seat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<GameOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            board: Board::new(),
            turn: Turn::Paused,
            player_one: String::new(),
            player_two: String::new(),
            ai_difficulty: None,
            next_starter: Seat::PlayerOne,
            outcome: None,
            event_log: Vec::new(),
        }
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<R: Rng + ?Sized>(config: SessionConfig, rng: &mut R) -> Result<Self, SetupError> {
        let mut session = Self::new();
        session.begin(config, rng)?;
        Ok(session)
    }

    /// 在已有会话上开新局，保留先手轮换。
    pub fn begin<R: Rng + ?Sized>(
        &mut self,
        config: SessionConfig,
        rng: &mut R,
    ) -> Result<(), SetupError> {
        let player_one = config.player_one.trim();
        if player_one.is_empty() {
            return Err(SetupError::MissingPlayerName {
                seat: Seat::PlayerOne,
            });
        }

        let (player_two, ai_difficulty) = match &config.opponent {
            Opponent::Human { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(SetupError::MissingPlayerName {
                        seat: Seat::PlayerTwo,
                    });
                }
                (name.to_owned(), None)
            }
            Opponent::Ai { difficulty } => (AI_NAME.to_owned(), Some(*difficulty)),
        };

        self.player_one = player_one.to_owned();
        self.player_two = player_two;
        self.ai_difficulty = ai_difficulty;
        self.open_game(rng);
        Ok(())
    }

    /// `restart_only` 只清空棋盘并换先手；否则连同玩家信息一起清除，等待重新开局。
    pub fn reset<R: Rng + ?Sized>(&mut self, restart_only: bool, rng: &mut R) {
        if restart_only && self.is_configured() {
            self.open_game(rng);
        } else {
            *self = Self::new();
        }
    }

    pub fn submit_move<R: Rng + ?Sized>(&mut self, cell: usize, rng: &mut R) -> MoveOutcome {
        let Some(seat) = self.turn.seat() else {
            return MoveOutcome::Rejected {
                reason: MoveError::GamePaused,
            };
        };
        if self.is_ai_seat(seat) {
            return MoveOutcome::Rejected {
                reason: MoveError::NotYourTurn,
            };
        }

        match self.place(seat, cell, None) {
            Ok(()) => self.handle_turn(rng),
            Err(reason) => MoveOutcome::Rejected { reason },
        }
    }

    /// 落子后结算：先判胜，再判和，否则换手；轮到 AI 时立即替它走一步。
    pub fn handle_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> MoveOutcome {
        let Some(seat) = self.turn.seat() else {
            return self.current_outcome().unwrap_or(MoveOutcome::Rejected {
                reason: MoveError::GamePaused,
            });
        };

        if let Some(pattern) = self.board.check_winner() {
            self.finish(GameOutcome::Won {
                winner: seat,
                pattern,
            });
            return MoveOutcome::Won {
                pattern,
                winner: self.name_of(seat).to_owned(),
            };
        }

        if self.board.is_draw() {
            self.finish(GameOutcome::Draw);
            return MoveOutcome::Draw;
        }

        self.turn = self.turn.next();
        match self.turn.seat() {
            Some(next) if self.is_ai_seat(next) => self.play_ai_turn(next, rng),
            _ => MoveOutcome::Continued,
        }
    }

    pub fn name_of(&self, seat: Seat) -> &str {
        match seat {
            Seat::PlayerOne => &self.player_one,
            Seat::PlayerTwo => &self.player_two,
        }
    }

    pub fn is_ai_seat(&self, seat: Seat) -> bool {
        seat == Seat::PlayerTwo && self.ai_difficulty.is_some()
    }

    pub fn is_configured(&self) -> bool {
        !self.player_one.is_empty() && !self.player_two.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// 已结束对局的结果，用于前端重绘。
    pub fn current_outcome(&self) -> Option<MoveOutcome> {
        self.outcome.map(|outcome| match outcome {
            GameOutcome::Won { winner, pattern } => MoveOutcome::Won {
                pattern,
                winner: self.name_of(winner).to_owned(),
            },
            GameOutcome::Draw => MoveOutcome::Draw,
        })
    }

    /// 校验从外部载入的会话是否处在状态机可达的位置。
    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        self.board.integrity_check()?;

        let terminal = self.board.check_winner().is_some() || self.board.is_draw();
        if (terminal || self.outcome.is_some()) && self.turn != Turn::Paused {
            return Err(IntegrityError::UnresolvedOutcome);
        }
        if terminal && self.outcome.is_none() {
            return Err(IntegrityError::MissingOutcome);
        }
        if self.turn == Turn::Paused && self.is_configured() && self.outcome.is_none() {
            return Err(IntegrityError::MissingOutcome);
        }
        if let Some(seat) = self.turn.seat() {
            if self.is_ai_seat(seat) {
                return Err(IntegrityError::AiHoldsTurn);
            }
        }
        Ok(())
    }

    pub fn events_since(&self, index: usize) -> &[GameEvent] {
        self.event_log.get(index..).unwrap_or_default()
    }

    fn open_game<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let starter = self.next_starter;
        self.board = Board::new();
        self.outcome = None;
        self.event_log.clear();
        self.turn = Turn::from(starter);
        self.next_starter = starter.other();
        self.record_event(GameEvent::GameStarted { starter });

        if self.is_ai_seat(starter) {
            self.play_ai_turn(starter, rng);
        }
    }

    fn play_ai_turn<R: Rng + ?Sized>(&mut self, seat: Seat, rng: &mut R) -> MoveOutcome {
        let difficulty = self.ai_difficulty.unwrap_or_default();
        let decision = select_move(&self.board, difficulty, seat.mark(), rng);
        // 非终局时棋盘上一定还有空格。
        let Some(cell) = decision.cell else {
            return MoveOutcome::Continued;
        };

        match self.place(seat, cell, decision.reason) {
            Ok(()) => self.handle_turn(rng),
            Err(reason) => MoveOutcome::Rejected { reason },
        }
    }

    fn place(&mut self, seat: Seat, cell: usize, reason: Option<MoveReason>) -> Result<(), MoveError> {
        let mark = seat.mark();
        self.board = self.board.apply_move(cell, mark)?;
        self.record_event(GameEvent::MovePlayed {
            seat,
            cell,
            mark,
            reason,
        });
        Ok(())
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.turn = Turn::Paused;
        self.outcome = Some(outcome);
        let event = match outcome {
            GameOutcome::Won { winner, pattern } => GameEvent::GameWon { winner, pattern },
            GameOutcome::Draw => GameEvent::GameDrawn,
        };
        self.record_event(event);
    }

    fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }
}

/// 一次操作后返回给前端的快照。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResolution {
    pub outcome: MoveOutcome,
    pub state: GameSession,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl MoveResolution {
    pub fn new(outcome: MoveOutcome, state: &GameSession, events_from: usize) -> Self {
        Self {
            banner: outcome.banner(),
            events: state.events_since(events_from).to_vec(),
            state: state.clone(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const X: Option<Mark> = Some(Mark::Cross);
    const O: Option<Mark> = Some(Mark::Circle);
    const E: Option<Mark> = None;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(2024)
    }

    fn two_players(rng: &mut SmallRng) -> GameSession {
        GameSession::start(SessionConfig::versus_human("Alice", "Bob"), rng)
            .expect("both names are present")
    }

    fn play(session: &mut GameSession, cells: &[usize], rng: &mut SmallRng) -> MoveOutcome {
        let mut outcome = MoveOutcome::Continued;
        for &cell in cells {
            outcome = session.submit_move(cell, rng);
        }
        outcome
    }

    #[test]
    fn first_game_starts_with_player_one() {
        let mut rng = rng();
        let session = two_players(&mut rng);
        assert_eq!(session.turn, Turn::PlayerOne);
        assert_eq!(session.next_starter, Seat::PlayerTwo);
        assert_eq!(
            session.event_log,
            vec![GameEvent::GameStarted {
                starter: Seat::PlayerOne
            }]
        );
    }

    #[test]
    fn turns_alternate_strictly() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);
        let expected = [Turn::PlayerTwo, Turn::PlayerOne, Turn::PlayerTwo, Turn::PlayerOne];
        for (cell, turn) in [4, 0, 8, 2].into_iter().zip(expected) {
            assert_eq!(session.submit_move(cell, &mut rng), MoveOutcome::Continued);
            assert_eq!(session.turn, turn);
        }
        assert_eq!(session.board.count(Mark::Cross), 2);
        assert_eq!(session.board.count(Mark::Circle), 2);
    }

    #[test]
    fn player_one_wins_top_row_and_game_pauses() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);

        let outcome = play(&mut session, &[0, 3, 1, 4, 2], &mut rng);
        assert_eq!(
            outcome,
            MoveOutcome::Won {
                pattern: [0, 1, 2],
                winner: "Alice".to_owned()
            }
        );
        assert_eq!(outcome.banner().as_deref(), Some("Alice has won"));
        assert_eq!(session.turn, Turn::Paused);

        let before = session.board;
        assert_eq!(
            session.submit_move(5, &mut rng),
            MoveOutcome::Rejected {
                reason: MoveError::GamePaused
            }
        );
        assert_eq!(session.board, before, "paused board must not change");
    }

    #[test]
    fn full_board_without_line_is_draw() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);
        let outcome = play(&mut session, &[0, 1, 2, 4, 3, 5, 7, 6, 8], &mut rng);
        assert_eq!(outcome, MoveOutcome::Draw);
        assert_eq!(outcome.banner().as_deref(), Some("Draw"));
        assert_eq!(session.turn, Turn::Paused);
        assert_eq!(session.current_outcome(), Some(MoveOutcome::Draw));
        assert_eq!(session.event_log.last(), Some(&GameEvent::GameDrawn));
    }

    #[test]
    fn occupied_cell_is_rejected_without_side_effects() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);
        session.submit_move(4, &mut rng);

        let snapshot = session.clone();
        assert_eq!(
            session.submit_move(4, &mut rng),
            MoveOutcome::Rejected {
                reason: MoveError::CellOccupied { cell: 4 }
            }
        );
        assert_eq!(session, snapshot);
    }

    #[test]
    fn out_of_range_cell_is_rejected() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);
        assert_eq!(
            session.submit_move(12, &mut rng),
            MoveOutcome::Rejected {
                reason: MoveError::OutOfRange { cell: 12 }
            }
        );
        assert_eq!(session.turn, Turn::PlayerOne);
    }

    #[test]
    fn restart_alternates_starter() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);
        session.submit_move(0, &mut rng);

        session.reset(true, &mut rng);
        assert_eq!(session.turn, Turn::PlayerTwo);
        assert_eq!(session.board, Board::new());
        assert_eq!(session.player_one, "Alice");

        session.reset(true, &mut rng);
        assert_eq!(session.turn, Turn::PlayerOne);
    }

    #[test]
    fn full_reset_clears_players_and_starter() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);
        session.reset(false, &mut rng);

        assert_eq!(session, GameSession::new());
        assert_eq!(
            session.submit_move(0, &mut rng),
            MoveOutcome::Rejected {
                reason: MoveError::GamePaused
            }
        );

        session
            .begin(SessionConfig::versus_human("Carol", "Dave"), &mut rng)
            .expect("names are present");
        assert_eq!(session.turn, Turn::PlayerOne);
        assert_eq!(session.name_of(Seat::PlayerTwo), "Dave");
    }

    #[test]
    fn restart_on_unconfigured_session_stays_paused() {
        let mut rng = rng();
        let mut session = GameSession::new();
        session.reset(true, &mut rng);
        assert_eq!(session.turn, Turn::Paused);
    }

    #[test]
    fn missing_names_are_reported() {
        let mut rng = rng();
        assert_eq!(
            GameSession::start(SessionConfig::versus_human("  ", "Bob"), &mut rng),
            Err(SetupError::MissingPlayerName {
                seat: Seat::PlayerOne
            })
        );
        assert_eq!(
            GameSession::start(SessionConfig::versus_human("Alice", ""), &mut rng),
            Err(SetupError::MissingPlayerName {
                seat: Seat::PlayerTwo
            })
        );
        assert!(
            GameSession::start(SessionConfig::versus_ai("Alice", AiDifficulty::Easy), &mut rng)
                .is_ok(),
            "AI opponent needs no second name"
        );
    }

    #[test]
    fn names_are_trimmed() {
        let mut rng = rng();
        let session = GameSession::start(SessionConfig::versus_human(" Alice ", "Bob\n"), &mut rng)
            .expect("names are present");
        assert_eq!(session.player_one, "Alice");
        assert_eq!(session.player_two, "Bob");
    }

    #[test]
    fn ai_replies_after_human_move() {
        let mut rng = rng();
        let mut session =
            GameSession::start(SessionConfig::versus_ai("Alice", AiDifficulty::Easy), &mut rng)
                .expect("name is present");
        assert_eq!(session.player_two, AI_NAME);

        assert_eq!(session.submit_move(4, &mut rng), MoveOutcome::Continued);
        assert_eq!(session.turn, Turn::PlayerOne);
        assert_eq!(session.board.count(Mark::Cross), 1);
        assert_eq!(session.board.count(Mark::Circle), 1);
        assert!(session.event_log.iter().any(|event| matches!(
            event,
            GameEvent::MovePlayed {
                seat: Seat::PlayerTwo,
                reason: Some(MoveReason::Random),
                ..
            }
        )));
    }

    #[test]
    fn easy_ai_uses_injected_rng() {
        let mut session = GameSession::start(
            SessionConfig::versus_ai("Alice", AiDifficulty::Easy),
            &mut StepRng::new(0, 0),
        )
        .expect("name is present");

        // 随机数恒为 0 时总是选第一个空格。
        session.submit_move(4, &mut StepRng::new(0, 0));
        assert_eq!(session.board.get(0), Some(Mark::Circle));
    }

    #[test]
    fn hard_ai_completes_its_line() {
        let mut rng = rng();
        let mut session =
            GameSession::start(SessionConfig::versus_ai("Alice", AiDifficulty::Hard), &mut rng)
                .expect("name is present");
        session.board = Board::from_cells([O, O, E, X, X, E, E, E, E]);

        let outcome = session.submit_move(8, &mut rng);
        assert_eq!(
            outcome,
            MoveOutcome::Won {
                pattern: [0, 1, 2],
                winner: AI_NAME.to_owned()
            }
        );
        assert_eq!(
            session.outcome,
            Some(GameOutcome::Won {
                winner: Seat::PlayerTwo,
                pattern: [0, 1, 2]
            })
        );
    }

    #[test]
    fn medium_ai_blocks_human_line() {
        let mut rng = rng();
        let mut session =
            GameSession::start(SessionConfig::versus_ai("Alice", AiDifficulty::Medium), &mut rng)
                .expect("name is present");
        session.board = Board::from_cells([X, E, E, E, O, E, E, E, E]);

        assert_eq!(session.submit_move(1, &mut rng), MoveOutcome::Continued);
        assert_eq!(session.board.get(2), Some(Mark::Circle));
    }

    #[test]
    fn ai_opens_when_restart_hands_it_the_first_move() {
        let mut rng = rng();
        let mut session =
            GameSession::start(SessionConfig::versus_ai("Alice", AiDifficulty::Hard), &mut rng)
                .expect("name is present");

        session.reset(true, &mut rng);
        assert_eq!(session.turn, Turn::PlayerOne, "AI already played its opening");
        assert_eq!(session.board.count(Mark::Circle), 1);
        assert_eq!(session.board.count(Mark::Cross), 0);
        assert_eq!(session.next_starter, Seat::PlayerOne);
    }

    #[test]
    fn human_cannot_move_for_the_ai() {
        let mut rng = rng();
        let mut session =
            GameSession::start(SessionConfig::versus_ai("Alice", AiDifficulty::Easy), &mut rng)
                .expect("name is present");
        session.turn = Turn::PlayerTwo;

        assert_eq!(
            session.submit_move(0, &mut rng),
            MoveOutcome::Rejected {
                reason: MoveError::NotYourTurn
            }
        );
        assert_eq!(session.board, Board::new());
    }

    #[test]
    fn paused_turn_never_advances() {
        assert_eq!(Turn::Paused.next(), Turn::Paused);
        assert_eq!(Turn::PlayerOne.next(), Turn::PlayerTwo);
        assert_eq!(Turn::PlayerTwo.next(), Turn::PlayerOne);
    }

    #[test]
    fn resolution_carries_only_new_events() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);
        let from = session.event_log.len();
        let outcome = session.submit_move(4, &mut rng);

        let resolution = MoveResolution::new(outcome, &session, from);
        assert_eq!(
            resolution.events,
            vec![GameEvent::MovePlayed {
                seat: Seat::PlayerOne,
                cell: 4,
                mark: Mark::Cross,
                reason: None
            }]
        );
        assert!(resolution.banner.is_none());
    }

    #[test]
    fn setup_error_uses_page_prompt() {
        let error = SetupError::MissingPlayerName {
            seat: Seat::PlayerTwo,
        };
        assert_eq!(error.to_string(), "Please enter name.");
    }

    #[test]
    fn live_sessions_pass_integrity_check() {
        let mut rng = rng();
        let mut session =
            GameSession::start(SessionConfig::versus_ai("Alice", AiDifficulty::Hard), &mut rng)
                .expect("name is present");
        assert_eq!(session.integrity_check(), Ok(()));

        session.submit_move(4, &mut rng);
        assert_eq!(session.integrity_check(), Ok(()));

        let mut finished = two_players(&mut rng);
        play(&mut finished, &[0, 3, 1, 4, 2], &mut rng);
        assert_eq!(finished.integrity_check(), Ok(()));

        assert_eq!(GameSession::new().integrity_check(), Ok(()));
    }

    #[test]
    fn integrity_check_rejects_ai_waiting_to_move() {
        let mut rng = rng();
        let mut session =
            GameSession::start(SessionConfig::versus_ai("Alice", AiDifficulty::Hard), &mut rng)
                .expect("name is present");
        session.board = Board::from_cells([X, E, E, E, E, E, E, E, E]);
        session.turn = Turn::PlayerTwo;

        assert_eq!(session.integrity_check(), Err(IntegrityError::AiHoldsTurn));
    }

    #[test]
    fn integrity_check_rejects_open_turn_on_won_board() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);
        session.board = Board::from_cells([O, O, O, X, X, E, E, E, E]);
        session.turn = Turn::PlayerOne;

        assert_eq!(
            session.integrity_check(),
            Err(IntegrityError::UnresolvedOutcome)
        );

        session.turn = Turn::Paused;
        assert_eq!(
            session.integrity_check(),
            Err(IntegrityError::MissingOutcome),
            "paused won board still needs its recorded outcome"
        );
    }

    #[test]
    fn integrity_check_rejects_open_turn_on_drawn_board() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);
        session.board = Board::from_cells([X, O, X, X, O, O, O, X, X]);
        session.turn = Turn::PlayerTwo;

        assert_eq!(
            session.integrity_check(),
            Err(IntegrityError::UnresolvedOutcome)
        );
    }

    #[test]
    fn integrity_check_rejects_paused_game_without_outcome() {
        let mut rng = rng();
        let mut session = two_players(&mut rng);
        session.submit_move(4, &mut rng);
        session.turn = Turn::Paused;

        assert_eq!(
            session.integrity_check(),
            Err(IntegrityError::MissingOutcome)
        );
    }

    #[test]
    fn outcome_json_is_tagged() {
        let outcome = MoveOutcome::Won {
            pattern: [2, 4, 6],
            winner: "Bob".to_owned(),
        };
        let json = serde_json::to_value(&outcome).expect("outcome serializes");
        assert_eq!(
            json,
            serde_json::json!({ "type": "Won", "pattern": [2, 4, 6], "winner": "Bob" })
        );
    }
}
