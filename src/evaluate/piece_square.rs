use std::hash::Hash;

use rustc_hash::FxHashMap;

use super::PieceLayout;
use crate::alpha_beta_searcher::{Evaluator, Score, SearchError};

/// Sums a per-square bonus for every occupied square, looked up by the piece standing on
/// it. Pieces without a table, and squares past the end of a table, add nothing.
#[derive(Clone, Debug)]
pub struct PieceSquareEvaluator<P> {
    tables: FxHashMap<P, Vec<Score>>,
}

impl<P: Eq + Hash> PieceSquareEvaluator<P> {
    pub fn new(tables: FxHashMap<P, Vec<Score>>) -> Self {
        Self { tables }
    }

    pub fn square_score(&self, piece: &P, square: usize) -> Score {
        self.tables
            .get(piece)
            .and_then(|table| table.get(square))
            .copied()
            .unwrap_or(0.0)
    }
}

impl<S: PieceLayout> Evaluator<S> for PieceSquareEvaluator<S::Piece> {
    fn evaluate(&mut self, state: &mut S) -> Result<Score, SearchError> {
        Ok(state
            .pieces()
            .iter()
            .map(|(square, piece)| self.square_score(piece, *square))
            .sum())
    }
}
