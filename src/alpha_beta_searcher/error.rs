use std::error::Error;

use thiserror::Error;

pub type BoxedError = Box<dyn Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("transposition table capacity must be at least 1")]
    InvalidTableCapacity,
    #[error("no available moves")]
    NoAvailableMoves,
    #[error("depth must be at least 1")]
    DepthTooLow,
    #[error("cannot expand a node with no remaining depth, the pipeline needs a horizon phase")]
    DepthExhausted,
    #[error("blend has {evaluators} evaluators but {weights} weights")]
    WeightCountMismatch { evaluators: usize, weights: usize },
    #[error("failed to apply move {game_move}")]
    MoveApplication {
        game_move: String,
        #[source]
        source: BoxedError,
    },
    #[error("failed to undo move {game_move}")]
    MoveUndo {
        game_move: String,
        #[source]
        source: BoxedError,
    },
}
