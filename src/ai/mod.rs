//! AI 落子模块（赢棋、堵棋、随机的启发式策略）。

pub mod heuristic;

pub use heuristic::{
    blocking_move, random_move, select_move, winning_move, AiAgent, AiDecision, AiDifficulty,
    MoveReason,
};
