//! Static evaluators usable at the search horizon.
//!
//! Material and piece-square evaluators score a board from a fixed perspective: every
//! piece identity (which includes its color) carries its own signed weight. Wrap them in
//! [`MoverRelative`] to get the side-to-move convention the searcher works in.

use std::fmt::Debug;
use std::hash::Hash;

use smallvec::SmallVec;

use crate::alpha_beta_searcher::{Evaluator, GameState, Score, SearchError};

mod blend;
mod material;
mod piece_square;

pub use blend::Blend;
pub use material::MaterialEvaluator;
pub use piece_square::PieceSquareEvaluator;

/// A board made of squares that may each hold one piece.
pub trait PieceLayout {
    type Piece: Copy + Eq + Hash + Debug;

    /// Every occupied square with the piece standing on it.
    fn pieces(&self) -> SmallVec<[(usize, Self::Piece); 32]>;
}

/// Flips a fixed-perspective score whenever the second player is to move.
#[derive(Clone, Debug)]
pub struct MoverRelative<E> {
    inner: E,
}

impl<E> MoverRelative<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<S: GameState, E: Evaluator<S>> Evaluator<S> for MoverRelative<E> {
    fn evaluate(&mut self, state: &mut S) -> Result<Score, SearchError> {
        let score = self.inner.evaluate(state)?;
        if state.is_maximizing_player() {
            Ok(score)
        } else {
            Ok(-score)
        }
    }
}
