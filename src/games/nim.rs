//! Nim: players take 1-3 objects from a pile, whoever takes the last object wins.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

use crate::alpha_beta_searcher::{
    Evaluator, GameMove, GameState, MoveGenerator, Outcome, Score, SearchError,
};

pub const MAX_TAKE: u8 = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NimError {
    #[error("cannot take {take} from a pile of {pile}")]
    InvalidTake { take: u8, pile: u8 },
    #[error("pile overflowed while undoing take {take}")]
    PileOverflow { take: u8 },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NimState {
    pile: u8,
    is_player_one_turn: bool,
}

impl NimState {
    pub fn new(pile: u8) -> Self {
        Self {
            pile,
            is_player_one_turn: true,
        }
    }

    pub fn pile(&self) -> u8 {
        self.pile
    }

    pub fn is_player_one_turn(&self) -> bool {
        self.is_player_one_turn
    }

    fn toggle_turn(&mut self) {
        self.is_player_one_turn = !self.is_player_one_turn;
    }
}

impl GameState for NimState {
    fn position_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    fn is_maximizing_player(&self) -> bool {
        self.is_player_one_turn
    }

    fn outcome(&self) -> Option<Outcome> {
        // The previous player took the last object.
        if self.pile == 0 {
            Some(Outcome::OpponentWins)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NimMove {
    pub take: u8,
}

impl fmt::Display for NimMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "take {}", self.take)
    }
}

impl GameMove for NimMove {
    type State = NimState;
    type Error = NimError;

    fn apply(&self, state: &mut NimState) -> Result<(), NimError> {
        if self.take == 0 || self.take > MAX_TAKE || self.take > state.pile {
            return Err(NimError::InvalidTake {
                take: self.take,
                pile: state.pile,
            });
        }
        state.pile -= self.take;
        state.toggle_turn();
        Ok(())
    }

    fn undo(&self, state: &mut NimState) -> Result<(), NimError> {
        state.pile = state
            .pile
            .checked_add(self.take)
            .ok_or(NimError::PileOverflow { take: self.take })?;
        state.toggle_turn();
        Ok(())
    }
}

#[derive(Clone, Copy, Default, Debug)]
pub struct NimMoveGenerator;

impl MoveGenerator<NimState> for NimMoveGenerator {
    type Move = NimMove;
    type MoveList = Vec<NimMove>;

    fn generate_moves(&self, state: &mut NimState) -> Vec<NimMove> {
        (1..=MAX_TAKE.min(state.pile))
            .map(|take| NimMove { take })
            .collect()
    }
}

/// Heuristic for cut-off searches: a pile that is a multiple of 4 is lost for the side to
/// move under perfect play.
#[derive(Clone, Copy, Default, Debug)]
pub struct NimEvaluator;

impl Evaluator<NimState> for NimEvaluator {
    fn evaluate(&mut self, state: &mut NimState) -> Result<Score, SearchError> {
        if state.pile % (MAX_TAKE + 1) == 0 {
            Ok(-1.0)
        } else {
            Ok(1.0)
        }
    }
}
