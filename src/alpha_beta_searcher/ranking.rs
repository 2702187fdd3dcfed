//! Root move ranking on top of the searcher.

use std::cmp::Ordering;

use log::debug;

use super::error::SearchError;
use super::search::{with_move_applied, AlphaBetaSearcher};
use super::traits::{GameState, MoveCollection, MoveGenerator, Score};

/// Scores every legal move from `state` with a full-window search of the resulting
/// position, one ply shallower than the searcher's depth. Moves come back best first;
/// moves with equal scores keep generator order.
pub fn rank_moves<S, G>(
    searcher: &mut AlphaBetaSearcher<S>,
    move_generator: &G,
    state: &mut S,
) -> Result<Vec<(G::Move, Score)>, SearchError>
where
    S: GameState,
    G: MoveGenerator<S>,
{
    let child_depth = searcher
        .depth()
        .checked_sub(1)
        .ok_or(SearchError::DepthTooLow)?;
    searcher.reset_stats();

    let candidates = move_generator.generate_moves(state);
    let mut ranked = Vec::with_capacity(candidates.len());

    for game_move in candidates.as_ref().iter() {
        let score = -with_move_applied(game_move, state, |state| {
            searcher.search(state, child_depth, Score::NEG_INFINITY, Score::INFINITY)
        })?;
        debug!("{:?}: {}", game_move, score);
        ranked.push((game_move.clone(), score));
    }

    ranked.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    Ok(ranked)
}

/// The highest ranked move and its score.
#[must_use = "search returns the best move found"]
pub fn best_move<S, G>(
    searcher: &mut AlphaBetaSearcher<S>,
    move_generator: &G,
    state: &mut S,
) -> Result<(G::Move, Score), SearchError>
where
    S: GameState,
    G: MoveGenerator<S>,
{
    rank_moves(searcher, move_generator, state)?
        .into_iter()
        .next()
        .ok_or(SearchError::NoAvailableMoves)
}
