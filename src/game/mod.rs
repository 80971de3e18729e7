//! 游戏核心逻辑模块（棋盘、回合状态机、胜负判定）。

pub mod board;
pub mod session;

pub use board::{Board, IntegrityError, Mark, MoveError, WinPattern, CELL_COUNT, WIN_PATTERNS};
pub use session::{
    GameEvent,
    GameOutcome,
    GameSession,
    MoveOutcome,
    MoveResolution,
    Opponent,
    Seat,
    SessionConfig,
    SetupError,
    Turn,
    AI_NAME,
};
