use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 棋盘格子数量。
pub const CELL_COUNT: usize = 9;

/// 一条获胜连线上的三个格子下标。
pub type WinPattern = [usize; 3];

/// 固定的 8 条获胜连线，按行、列、对角线的顺序声明。
pub const WIN_PATTERNS: [WinPattern; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 玩家落下的标记。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Cross,
    Circle,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Mark::Cross => Mark::Circle,
            Mark::Circle => Mark::Cross,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Mark::Cross => '✕',
            Mark::Circle => '◯',
        }
    }
}

impl FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cross" | "x" | "✕" => Ok(Mark::Cross),
            "circle" | "o" | "◯" => Ok(Mark::Circle),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MoveError {
    OutOfRange { cell: usize },
    CellOccupied { cell: usize },
    GamePaused,
    NotYourTurn,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::OutOfRange { cell } => {
                write!(f, "cell {cell} is outside the board (0..{CELL_COUNT})")
            }
            MoveError::CellOccupied { cell } => write!(f, "cell {cell} is already marked"),
            MoveError::GamePaused => f.write_str("the game is over; reset to play again"),
            MoveError::NotYourTurn => f.write_str("it is the AI's turn"),
        }
    }
}

impl std::error::Error for MoveError {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    MarkImbalance { crosses: usize, circles: usize },
    AiHoldsTurn,
    UnresolvedOutcome,
    MissingOutcome,
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityError::MarkImbalance { crosses, circles } => write!(
                f,
                "impossible board: {crosses} crosses against {circles} circles"
            ),
            IntegrityError::AiHoldsTurn => {
                f.write_str("the AI cannot be waiting to move between calls")
            }
            IntegrityError::UnresolvedOutcome => {
                f.write_str("a finished game must be paused")
            }
            IntegrityError::MissingOutcome => {
                f.write_str("a paused game in progress must record its outcome")
            }
        }
    }
}

impl std::error::Error for IntegrityError {}

/// 3x3 棋盘，按行优先存放 9 个格子。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Mark>; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Option<Mark>; CELL_COUNT]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Option<Mark>; CELL_COUNT] {
        &self.cells
    }

    pub fn get(&self, cell: usize) -> Option<Mark> {
        self.cells.get(cell).copied().flatten()
    }

    /// 返回落子后的新棋盘；失败时原棋盘保持不变。
    pub fn apply_move(&self, cell: usize, mark: Mark) -> Result<Board, MoveError> {
        match self.cells.get(cell) {
            None => Err(MoveError::OutOfRange { cell }),
            Some(Some(_)) => Err(MoveError::CellOccupied { cell }),
            Some(None) => {
                let mut next = *self;
                next.cells[cell] = Some(mark);
                Ok(next)
            }
        }
    }

    /// 按声明顺序查找第一条三个格子相同且非空的连线。
    pub fn check_winner(&self) -> Option<WinPattern> {
        WIN_PATTERNS.iter().copied().find(|&[a, b, c]| {
            self.cells[a].is_some() && self.cells[a] == self.cells[b] && self.cells[a] == self.cells[c]
        })
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn is_draw(&self) -> bool {
        self.is_full() && self.check_winner().is_none()
    }

    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|cell| **cell == Some(mark)).count()
    }

    pub fn moves_played(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// 起手方轮换，所以两种标记的数量最多相差 1。
    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let crosses = self.count(Mark::Cross);
        let circles = self.count(Mark::Circle);
        if crosses.abs_diff(circles) > 1 {
            return Err(IntegrityError::MarkImbalance { crosses, circles });
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in chunk {
                let symbol = cell.map(Mark::symbol).unwrap_or('·');
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}
