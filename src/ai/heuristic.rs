use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::{Board, Mark, WIN_PATTERNS};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "medium" | "normal" => Ok(AiDifficulty::Medium),
            "hard" => Ok(AiDifficulty::Hard),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AiDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AiDifficulty::Easy => "easy",
            AiDifficulty::Medium => "medium",
            AiDifficulty::Hard => "hard",
        })
    }
}

/// AI 选中某个格子的原因。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MoveReason {
    Win,
    Block,
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<MoveReason>,
    pub difficulty: AiDifficulty,
}

impl AiDecision {
    fn pick(cell: usize, reason: MoveReason, difficulty: AiDifficulty) -> Self {
        Self {
            cell: Some(cell),
            reason: Some(reason),
            difficulty,
        }
    }

    fn none(difficulty: AiDifficulty) -> Self {
        Self {
            cell: None,
            reason: None,
            difficulty,
        }
    }
}

/// 在某条连线上寻找“两子加一空”的空格。
///
/// 扫描顺序固定为 [`WIN_PATTERNS`] 的声明顺序，返回第一个满足条件的空格。
/// 这是启发式：看不到双杀（fork）。
pub fn completing_move(board: &Board, mark: Mark) -> Option<usize> {
    WIN_PATTERNS.iter().find_map(|pattern| {
        let mut owned = 0;
        let mut empty = None;
        for &index in pattern {
            match board.get(index) {
                Some(cell) if cell == mark => owned += 1,
                Some(_) => {}
                None => empty = Some(index),
            }
        }
        if owned == 2 {
            empty
        } else {
            None
        }
    })
}

pub fn winning_move(board: &Board, ai_mark: Mark) -> Option<usize> {
    completing_move(board, ai_mark)
}

pub fn blocking_move(board: &Board, ai_mark: Mark) -> Option<usize> {
    completing_move(board, ai_mark.opponent())
}

pub fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<usize> {
    board.empty_cells().choose(rng).copied()
}

/// 根据难度为 `ai_mark` 一方挑选落子位置；棋盘已满时返回空决策。
pub fn select_move<R: Rng + ?Sized>(
    board: &Board,
    difficulty: AiDifficulty,
    ai_mark: Mark,
    rng: &mut R,
) -> AiDecision {
    if difficulty == AiDifficulty::Hard {
        if let Some(cell) = winning_move(board, ai_mark) {
            return AiDecision::pick(cell, MoveReason::Win, difficulty);
        }
    }

    if matches!(difficulty, AiDifficulty::Medium | AiDifficulty::Hard) {
        if let Some(cell) = blocking_move(board, ai_mark) {
            return AiDecision::pick(cell, MoveReason::Block, difficulty);
        }
    }

    match random_move(board, rng) {
        Some(cell) => AiDecision::pick(cell, MoveReason::Random, difficulty),
        None => AiDecision::none(difficulty),
    }
}

pub struct AiAgent {
    difficulty: AiDifficulty,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(difficulty: AiDifficulty) -> Self {
        Self {
            difficulty,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(difficulty: AiDifficulty, seed: u64) -> Self {
        Self {
            difficulty,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn difficulty(&self) -> AiDifficulty {
        self.difficulty
    }

    pub fn decide_move(&mut self, board: &Board, ai_mark: Mark) -> AiDecision {
        select_move(board, self.difficulty, ai_mark, &mut self.rng)
    }
}
