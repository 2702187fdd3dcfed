use rustc_hash::FxHashMap;

use super::PieceLayout;
use crate::alpha_beta_searcher::{Evaluator, Score, SearchError};

/// Sums a fixed weight per piece over every piece on the board.
#[derive(Clone, Debug)]
pub struct MaterialEvaluator<P> {
    piece_scores: FxHashMap<P, Score>,
}

impl<P: Eq + std::hash::Hash> MaterialEvaluator<P> {
    /// Pieces missing from `piece_scores` are worth nothing.
    pub fn new(piece_scores: FxHashMap<P, Score>) -> Self {
        Self { piece_scores }
    }

    pub fn piece_score(&self, piece: &P) -> Score {
        self.piece_scores.get(piece).copied().unwrap_or(0.0)
    }
}

impl<S: PieceLayout> Evaluator<S> for MaterialEvaluator<S::Piece> {
    fn evaluate(&mut self, state: &mut S) -> Result<Score, SearchError> {
        Ok(state
            .pieces()
            .iter()
            .map(|(_, piece)| self.piece_score(piece))
            .sum())
    }
}
