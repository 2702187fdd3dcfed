//! Node phases: the independently pluggable steps the searcher runs at every node.
//!
//! A phase receives the window left by the phases before it and either passes a
//! (possibly narrowed) window on, or resolves the node by collapsing the window to a
//! single value. The canonical order is transposition lookup, terminal outcome, horizon,
//! expansion.

use std::cell::RefCell;

use log::trace;
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use super::error::SearchError;
use super::search::{with_move_applied, SearchContext, Window};
use super::traits::{Evaluator, GameState, MoveGenerator, Score};
use super::transposition_table::NodeType;

/// Output of a single phase.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PhaseResult {
    pub window: Window,
    pub value: Option<Score>,
}

impl PhaseResult {
    /// Hands the window to the next phase without resolving the node.
    pub fn pass(window: Window) -> Self {
        Self {
            window,
            value: None,
        }
    }

    /// Resolves the node to `value`.
    pub fn resolved(value: Score) -> Self {
        Self {
            window: Window::collapsed(value),
            value: Some(value),
        }
    }
}

pub trait NodePhase<S: GameState> {
    fn evaluate(
        &self,
        context: &mut SearchContext<'_, S>,
        state: &mut S,
        depth: u8,
        window: Window,
    ) -> Result<PhaseResult, SearchError>;
}

/// Tightens the window with a cached record searched at least as deep as this node.
#[derive(Clone, Copy, Default, Debug)]
pub struct TranspositionLookup;

impl<S: GameState> NodePhase<S> for TranspositionLookup {
    fn evaluate(
        &self,
        context: &mut SearchContext<'_, S>,
        state: &mut S,
        depth: u8,
        window: Window,
    ) -> Result<PhaseResult, SearchError> {
        let hash = state.position_hash();
        let record = match context.transposition_table().entry(hash).usable_at(depth) {
            Some(record) => *record,
            None => return Ok(PhaseResult::pass(window)),
        };

        let mut window = window;
        match record.node_type {
            NodeType::Pv => window = Window::collapsed(record.score),
            NodeType::All => window.beta = window.beta.min(record.score),
            NodeType::Cut => window.alpha = window.alpha.max(record.score),
        }

        if window.alpha >= window.beta {
            trace!(
                "table cutoff for {:#018x}: {:?} {}",
                hash,
                record.node_type,
                record.score
            );
            context.stats_mut().table_cutoffs += 1;
            return Ok(PhaseResult::resolved(record.score));
        }

        Ok(PhaseResult::pass(window))
    }
}

/// Resolves finished games to their exact value.
#[derive(Clone, Copy, Default, Debug)]
pub struct TerminalOutcome;

impl<S: GameState> NodePhase<S> for TerminalOutcome {
    fn evaluate(
        &self,
        context: &mut SearchContext<'_, S>,
        state: &mut S,
        _depth: u8,
        window: Window,
    ) -> Result<PhaseResult, SearchError> {
        match state.outcome() {
            Some(outcome) => {
                context.stats_mut().terminal_nodes += 1;
                Ok(PhaseResult::resolved(outcome.score()))
            }
            None => Ok(PhaseResult::pass(window)),
        }
    }
}

/// Hands depth 0 nodes to a static evaluator.
pub struct Horizon<E> {
    evaluator: RefCell<E>,
}

impl<E> Horizon<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator: RefCell::new(evaluator),
        }
    }
}

impl<S: GameState, E: Evaluator<S>> NodePhase<S> for Horizon<E> {
    fn evaluate(
        &self,
        context: &mut SearchContext<'_, S>,
        state: &mut S,
        depth: u8,
        window: Window,
    ) -> Result<PhaseResult, SearchError> {
        if depth > 0 {
            return Ok(PhaseResult::pass(window));
        }

        let value = self.evaluator.borrow_mut().evaluate(state)?;
        context.stats_mut().horizon_evaluations += 1;
        Ok(PhaseResult::resolved(value))
    }
}

/// The negamax step: recurse into every legal move until the window closes.
pub struct Expansion<G> {
    move_generator: G,
}

impl<G> Expansion<G> {
    pub fn new(move_generator: G) -> Self {
        Self { move_generator }
    }
}

impl<S: GameState, G: MoveGenerator<S>> NodePhase<S> for Expansion<G> {
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    fn evaluate(
        &self,
        context: &mut SearchContext<'_, S>,
        state: &mut S,
        depth: u8,
        window: Window,
    ) -> Result<PhaseResult, SearchError> {
        let child_depth = depth.checked_sub(1).ok_or(SearchError::DepthExhausted)?;
        let candidates = self.move_generator.generate_moves(state);

        let mut window = window;
        let mut best_score = Score::NEG_INFINITY;

        for game_move in candidates.as_ref().iter() {
            let child_window = window.negated();
            let score = -with_move_applied(game_move, state, |state| {
                context.search(state, child_depth, child_window)
            })?;

            best_score = best_score.max(score);
            window.alpha = window.alpha.max(best_score);

            if window.alpha >= window.beta {
                trace!("beta cutoff at depth {} after {:?}", depth, game_move);
                context.stats_mut().beta_cutoffs += 1;
                break;
            }
        }

        Ok(PhaseResult {
            window,
            value: Some(best_score),
        })
    }
}
