//! Tic-tac-toe rules for the alpha-beta search traits.
//!
//! Squares are numbered 0..9 row by row from the top left. Positions are written as nine
//! characters (`X`, `O` or `.`), optionally followed by the side to move:
//! `"XO..X.... o"`. Without a side, X moves when both sides have placed the same number
//! of marks.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use super::zobrist::{Zobrist, SQUARES};
use crate::alpha_beta_searcher::{GameMove, GameState, MoveGenerator, Outcome, Score};
use crate::evaluate::{MaterialEvaluator, PieceLayout, PieceSquareEvaluator};

static ZOBRIST: Lazy<Zobrist> = Lazy::new(Zobrist::new);

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opposite(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn to_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MoveError {
    #[error("square {square} is off the board")]
    OffBoard { square: u8 },
    #[error("square {square} is already occupied")]
    SquareOccupied { square: u8 },
    #[error("cannot undo square {square}, it does not hold the previous mover's mark")]
    NotPlacedByPreviousMover { square: u8 },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParsePositionError {
    #[error("expected 9 squares, found {0}")]
    WrongSquareCount(usize),
    #[error("invalid square character {0:?}")]
    InvalidSquare(char),
    #[error("invalid side to move {0:?}, expected `x` or `o`")]
    InvalidSideToMove(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Mark>; SQUARES],
    to_move: Mark,
    hash: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The empty board with X to move.
    pub fn new() -> Self {
        Self {
            cells: [None; SQUARES],
            to_move: Mark::X,
            hash: 0,
        }
    }

    pub fn get(&self, square: usize) -> Option<Mark> {
        self.cells.get(square).copied().flatten()
    }

    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    fn put(&mut self, square: usize, mark: Mark) {
        self.cells[square] = Some(mark);
        self.hash ^= ZOBRIST.mark_square_num(mark.index(), square);
    }

    fn clear(&mut self, square: usize, mark: Mark) {
        self.cells[square] = None;
        self.hash ^= ZOBRIST.mark_square_num(mark.index(), square);
    }

    fn toggle_turn(&mut self) {
        self.to_move = self.to_move.opposite();
        self.hash ^= ZOBRIST.second_player_num();
    }

    fn set_turn(&mut self, mark: Mark) {
        if self.to_move != mark {
            self.toggle_turn();
        }
    }

    /// The mark that has completed a line, if any.
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|line| {
            let first = self.cells[line[0]]?;
            line.iter()
                .all(|&square| self.cells[square] == Some(first))
                .then(|| first)
        })
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Flips the board top to bottom and swaps the marks, including the side to move.
    pub fn mirror(&self) -> Self {
        let mut mirrored = Self::new();
        for (square, cell) in self.cells.iter().enumerate() {
            if let Some(mark) = cell {
                let row = square / 3;
                let column = square % 3;
                mirrored.put((2 - row) * 3 + column, mark.opposite());
            }
        }
        mirrored.set_turn(self.to_move.opposite());
        mirrored
    }

    /// The compact notation accepted by `FromStr`.
    pub fn notation(&self) -> String {
        let squares: String = self
            .cells
            .iter()
            .map(|cell| cell.map_or('.', Mark::to_char))
            .collect();
        format!("{} {}", squares, self.to_move.to_char().to_ascii_lowercase())
    }
}

impl FromStr for Board {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let squares = parts.next().unwrap_or("");
        let side = parts.next();

        let count = squares.chars().count();
        if count != SQUARES {
            return Err(ParsePositionError::WrongSquareCount(count));
        }

        let mut board = Board::new();
        for (square, c) in squares.chars().enumerate() {
            match c {
                'X' | 'x' => board.put(square, Mark::X),
                'O' | 'o' => board.put(square, Mark::O),
                '.' => {}
                _ => return Err(ParsePositionError::InvalidSquare(c)),
            }
        }

        let to_move = match side {
            Some("x") | Some("X") => Mark::X,
            Some("o") | Some("O") => Mark::O,
            Some(other) => return Err(ParsePositionError::InvalidSideToMove(other.to_string())),
            None => {
                let xs = board.cells.iter().filter(|c| **c == Some(Mark::X)).count();
                let os = board.cells.iter().filter(|c| **c == Some(Mark::O)).count();
                if xs > os {
                    Mark::O
                } else {
                    Mark::X
                }
            }
        };
        board.set_turn(to_move);

        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(3) {
            let line: String = row
                .iter()
                .map(|cell| cell.map_or('.', Mark::to_char))
                .collect();
            writeln!(f, "{}", line)?;
        }
        write!(f, "{} to move", self.to_move.to_char())
    }
}

impl GameState for Board {
    #[inline]
    fn position_hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    fn is_maximizing_player(&self) -> bool {
        self.to_move == Mark::X
    }

    fn outcome(&self) -> Option<Outcome> {
        match self.winner() {
            Some(mark) if mark == self.to_move => Some(Outcome::MoverWins),
            Some(_) => Some(Outcome::OpponentWins),
            None if self.is_full() => Some(Outcome::Draw),
            None => None,
        }
    }
}

impl PieceLayout for Board {
    type Piece = Mark;

    fn pieces(&self) -> SmallVec<[(usize, Mark); 32]> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(square, cell)| cell.map(|mark| (square, mark)))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TicTacToeMove {
    pub square: u8,
}

impl TicTacToeMove {
    pub fn new(square: u8) -> Self {
        Self { square }
    }
}

impl fmt::Display for TicTacToeMove {
    /// Column letter and row number, with row 1 at the bottom: square 0 is `a3`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let column = (b'a' + self.square % 3) as char;
        let row = 3 - self.square / 3;
        write!(f, "{}{}", column, row)
    }
}

impl GameMove for TicTacToeMove {
    type State = Board;
    type Error = MoveError;

    fn apply(&self, state: &mut Board) -> Result<(), MoveError> {
        let square = self.square as usize;
        if square >= SQUARES {
            return Err(MoveError::OffBoard {
                square: self.square,
            });
        }
        if state.cells[square].is_some() {
            return Err(MoveError::SquareOccupied {
                square: self.square,
            });
        }

        state.put(square, state.to_move);
        state.toggle_turn();
        Ok(())
    }

    fn undo(&self, state: &mut Board) -> Result<(), MoveError> {
        let square = self.square as usize;
        let previous_mover = state.to_move.opposite();
        if state.get(square) != Some(previous_mover) {
            return Err(MoveError::NotPlacedByPreviousMover {
                square: self.square,
            });
        }

        state.clear(square, previous_mover);
        state.toggle_turn();
        Ok(())
    }
}

pub type TicTacToeMoveList = SmallVec<[TicTacToeMove; SQUARES]>;

#[derive(Clone, Copy, Default, Debug)]
pub struct TicTacToeMoveGenerator;

impl MoveGenerator<Board> for TicTacToeMoveGenerator {
    type Move = TicTacToeMove;
    type MoveList = TicTacToeMoveList;

    fn generate_moves(&self, state: &mut Board) -> TicTacToeMoveList {
        if state.outcome().is_some() {
            return SmallVec::new();
        }
        (0..SQUARES as u8)
            .filter(|&square| state.cells[square as usize].is_none())
            .map(TicTacToeMove::new)
            .collect()
    }
}

/// One point per mark, positive for X.
pub fn material_evaluator() -> MaterialEvaluator<Mark> {
    let mut scores = FxHashMap::default();
    scores.insert(Mark::X, 1.0);
    scores.insert(Mark::O, -1.0);
    MaterialEvaluator::new(scores)
}

// Squares weighted by the number of lines through them.
const SQUARE_BONUS: [Score; SQUARES] = [2.0, 1.0, 2.0, 1.0, 3.0, 1.0, 2.0, 1.0, 2.0];

/// Rewards marks on squares that sit on many lines, positive for X.
pub fn positional_evaluator() -> PieceSquareEvaluator<Mark> {
    let mut tables = FxHashMap::default();
    tables.insert(Mark::X, SQUARE_BONUS.to_vec());
    tables.insert(Mark::O, SQUARE_BONUS.iter().map(|bonus| -bonus).collect());
    PieceSquareEvaluator::new(tables)
}
