//! Core traits for generic alpha-beta search.

use std::error::Error;
use std::fmt::Debug;

use smallvec::{Array, SmallVec};

use super::error::SearchError;

/// Search score, always from the perspective of the side to move.
///
/// `f64::INFINITY` is a won position, `f64::NEG_INFINITY` a lost one and `0.0` a draw.
pub type Score = f64;

/// Terminal result of a game, relative to the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    MoverWins,
    OpponentWins,
    Draw,
}

impl Outcome {
    /// The exact value of a position with this outcome.
    pub fn score(self) -> Score {
        match self {
            Outcome::MoverWins => Score::INFINITY,
            Outcome::OpponentWins => Score::NEG_INFINITY,
            Outcome::Draw => 0.0,
        }
    }
}

/// Represents the state of a two-player zero-sum game.
pub trait GameState {
    /// Returns a hash of the current position for transposition table lookups.
    /// Identical game states must hash identically.
    fn position_hash(&self) -> u64;

    /// Returns true if the side to move is the first player.
    fn is_maximizing_player(&self) -> bool;

    /// Returns the terminal outcome, or `None` while the game is still in progress.
    fn outcome(&self) -> Option<Outcome>;
}

/// Represents an action that can be applied to and undone from a game state.
///
/// Applying a move also hands the turn to the other player; undoing it hands it back.
pub trait GameMove: Clone + PartialEq + Debug {
    type State: GameState;
    type Error: Error + Send + Sync + 'static;

    /// Applies this move to the given state.
    fn apply(&self, state: &mut Self::State) -> Result<(), Self::Error>;

    /// Undoes this move on the given state.
    fn undo(&self, state: &mut Self::State) -> Result<(), Self::Error>;
}

/// Generates all legal moves from a given game state.
///
/// The returned list is finite and its order is the order the search visits moves in.
/// Calling this twice on the same state must yield the same moves.
pub trait MoveGenerator<S: GameState> {
    type Move: GameMove<State = S>;
    type MoveList: MoveCollection<Self::Move>;

    /// Generates all legal moves for the current player.
    fn generate_moves(&self, state: &mut S) -> Self::MoveList;
}

/// Evaluates a game position and returns a score from the mover's perspective.
pub trait Evaluator<S> {
    fn evaluate(&mut self, state: &mut S) -> Result<Score, SearchError>;
}

impl<S, E: Evaluator<S> + ?Sized> Evaluator<S> for Box<E> {
    fn evaluate(&mut self, state: &mut S) -> Result<Score, SearchError> {
        (**self).evaluate(state)
    }
}

/// Abstraction over move collections (Vec, SmallVec, etc.)
pub trait MoveCollection<M>: AsRef<[M]> + AsMut<[M]> {
    #[inline]
    fn is_empty(&self) -> bool {
        self.as_ref().is_empty()
    }

    #[inline]
    fn len(&self) -> usize {
        self.as_ref().len()
    }
}

impl<M> MoveCollection<M> for Vec<M> {}

impl<A: Array> MoveCollection<A::Item> for SmallVec<A> {}
