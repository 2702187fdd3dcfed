//! Generic alpha-beta search over any two-player zero-sum game.

mod error;
mod phases;
mod ranking;
mod search;
mod traits;
mod transposition_table;

pub use error::{BoxedError, SearchError};
pub use phases::{Expansion, Horizon, NodePhase, PhaseResult, TerminalOutcome, TranspositionLookup};
pub use ranking::{best_move, rank_moves};
pub use search::{AlphaBetaSearcher, SearchConfig, SearchContext, SearchStats, Window};
pub use traits::{Evaluator, GameMove, GameState, MoveCollection, MoveGenerator, Outcome, Score};
pub use transposition_table::{
    NodeType, TableEntry, TableRecord, TranspositionTable, DEFAULT_TABLE_CAPACITY,
};

#[cfg(test)]
mod tests;
