//! Concrete rules for small games, implementing the alpha-beta search traits.

pub mod nim;
pub mod tic_tac_toe;
mod zobrist;

pub use nim::{NimEvaluator, NimMove, NimMoveGenerator, NimState};
pub use tic_tac_toe::{Board, Mark, TicTacToeMove, TicTacToeMoveGenerator};
