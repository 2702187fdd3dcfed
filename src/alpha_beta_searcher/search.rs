//! Alpha-beta search algorithm implementation.
//!
//! # Core Algorithm
//!
//! Alpha-beta pruning is an optimization of minimax search that maintains a window [alpha, beta]
//! representing the range of scores that matter. Moves that fall outside this window can be
//! pruned without affecting the final result. Scores are always relative to the side to move
//! (negamax), so each recursive call negates and swaps the window.
//!
//! # Node Phases
//!
//! Instead of a single monolithic function, every node runs an ordered list of
//! [`NodePhase`]s. Each phase sees the window left by the previous ones and may narrow it or
//! resolve the node outright. The chain stops as soon as the window collapses
//! (`alpha == beta`). The standard pipeline is:
//!
//! 1. [`TranspositionLookup`]: reuse a cached record searched at least as deep
//! 2. [`TerminalOutcome`]: won, lost and drawn games get their exact value
//! 3. [`Horizon`]: depth 0 nodes are scored by a static evaluator
//! 4. [`Expansion`]: recurse into every legal move until the window closes
//!
//! ## Transposition Tables
//! After the phase chain, the node's value is stored by position hash. The node type is
//! classified against the window the node was *entered* with, not the window the phases
//! narrowed it to.

use log::{debug, error};
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use super::error::SearchError;
use super::phases::{Expansion, Horizon, NodePhase, TerminalOutcome, TranspositionLookup};
use super::traits::{Evaluator, GameMove, GameState, MoveGenerator, Score};
use super::transposition_table::{NodeType, TranspositionTable, DEFAULT_TABLE_CAPACITY};

/// Search configuration parameters.
#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
    pub depth: u8,
    pub table_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            table_capacity: DEFAULT_TABLE_CAPACITY,
        }
    }
}

/// The (alpha, beta) bounds a node is searched with.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Window {
    pub alpha: Score,
    pub beta: Score,
}

impl Window {
    pub const FULL: Window = Window {
        alpha: Score::NEG_INFINITY,
        beta: Score::INFINITY,
    };

    pub fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }

    /// A window that admits nothing but `value`.
    pub fn collapsed(value: Score) -> Self {
        Self {
            alpha: value,
            beta: value,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.alpha == self.beta
    }

    /// The window as seen from the opponent's side.
    pub fn negated(&self) -> Self {
        Self {
            alpha: -self.beta,
            beta: -self.alpha,
        }
    }
}

/// Statistics collected during search.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct SearchStats {
    pub(crate) nodes: usize,
    pub(crate) table_cutoffs: usize,
    pub(crate) terminal_nodes: usize,
    pub(crate) horizon_evaluations: usize,
    pub(crate) beta_cutoffs: usize,
}

impl SearchStats {
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn table_cutoffs(&self) -> usize {
        self.table_cutoffs
    }

    pub fn terminal_nodes(&self) -> usize {
        self.terminal_nodes
    }

    pub fn horizon_evaluations(&self) -> usize {
        self.horizon_evaluations
    }

    pub fn beta_cutoffs(&self) -> usize {
        self.beta_cutoffs
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything a phase may touch besides the position: the phase pipeline (for recursion),
/// the transposition table and the statistics.
pub struct SearchContext<'a, S> {
    phases: &'a [Box<dyn NodePhase<S>>],
    transposition_table: &'a mut TranspositionTable,
    stats: &'a mut SearchStats,
}

impl<'a, S: GameState> SearchContext<'a, S> {
    /// Runs the phase pipeline on `state` and records the result in the table.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    pub fn search(
        &mut self,
        state: &mut S,
        depth: u8,
        window: Window,
    ) -> Result<Score, SearchError> {
        self.stats.nodes += 1;

        let phases = self.phases;
        let original_window = window;
        let mut window = window;
        let mut value = Score::NEG_INFINITY;

        for phase in phases.iter() {
            let result = phase.evaluate(self, state, depth, window)?;
            window = result.window;
            if let Some(resolved) = result.value {
                value = resolved;
            }
            if window.is_resolved() {
                break;
            }
        }

        let node_type = NodeType::classify(value, original_window.alpha, original_window.beta);
        self.transposition_table
            .store(state.position_hash(), depth, value, node_type);

        Ok(value)
    }

    pub fn transposition_table(&mut self) -> &mut TranspositionTable {
        &mut *self.transposition_table
    }

    pub fn stats_mut(&mut self) -> &mut SearchStats {
        &mut *self.stats
    }
}

/// A move that has been applied to a state and is undone when this guard goes away.
///
/// [`AppliedMove::undo`] is the normal exit and reports undo failures. If the guard is
/// dropped without it (a panic unwinding through the search), `Drop` undoes the move.
struct AppliedMove<'s, M: GameMove> {
    game_move: &'s M,
    state: &'s mut M::State,
    armed: bool,
}

impl<'s, M: GameMove> AppliedMove<'s, M> {
    fn apply(game_move: &'s M, state: &'s mut M::State) -> Result<Self, SearchError> {
        game_move
            .apply(state)
            .map_err(|source| SearchError::MoveApplication {
                game_move: format!("{:?}", game_move),
                source: Box::new(source),
            })?;

        Ok(Self {
            game_move,
            state,
            armed: true,
        })
    }

    fn state(&mut self) -> &mut M::State {
        &mut *self.state
    }

    fn undo(mut self) -> Result<(), SearchError> {
        self.armed = false;
        self.game_move
            .undo(&mut *self.state)
            .map_err(|source| SearchError::MoveUndo {
                game_move: format!("{:?}", self.game_move),
                source: Box::new(source),
            })
    }
}

impl<M: GameMove> Drop for AppliedMove<'_, M> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = self.game_move.undo(&mut *self.state) {
            error!("failed to undo {:?} while unwinding: {}", self.game_move, err);
        }
    }
}

/// Applies a move, executes a closure with the new state, then undoes the move.
///
/// The move is undone on every exit path. An error from the closure takes precedence over
/// an error from the undo.
pub(crate) fn with_move_applied<M, F, R>(
    game_move: &M,
    state: &mut M::State,
    f: F,
) -> Result<R, SearchError>
where
    M: GameMove,
    F: FnOnce(&mut M::State) -> Result<R, SearchError>,
{
    let mut applied = AppliedMove::apply(game_move, state)?;
    let result = f(applied.state());
    let undone = applied.undo();

    if let (Err(search_err), Err(undo_err)) = (&result, &undone) {
        error!(
            "failed to undo {:?} after search error ({}): {}",
            game_move, search_err, undo_err
        );
    }

    let value = result?;
    undone?;
    Ok(value)
}

/// Fixed-depth alpha-beta searcher built from an ordered list of node phases.
///
/// The searcher is itself an [`Evaluator`], so it can serve as the horizon evaluator of
/// another searcher.
pub struct AlphaBetaSearcher<S> {
    depth: u8,
    phases: Vec<Box<dyn NodePhase<S>>>,
    transposition_table: TranspositionTable,
    stats: SearchStats,
}

impl<S: GameState> AlphaBetaSearcher<S> {
    pub fn new(
        depth: u8,
        phases: Vec<Box<dyn NodePhase<S>>>,
        transposition_table: TranspositionTable,
    ) -> Self {
        Self {
            depth,
            phases,
            transposition_table,
            stats: SearchStats::default(),
        }
    }

    /// Builds the standard pipeline: transposition lookup, terminal outcome, horizon,
    /// expansion.
    pub fn with_standard_phases<G, E>(
        config: SearchConfig,
        move_generator: G,
        horizon_evaluator: E,
    ) -> Result<Self, SearchError>
    where
        G: MoveGenerator<S> + 'static,
        E: Evaluator<S> + 'static,
    {
        let phases: Vec<Box<dyn NodePhase<S>>> = vec![
            Box::new(TranspositionLookup),
            Box::new(TerminalOutcome),
            Box::new(Horizon::new(horizon_evaluator)),
            Box::new(Expansion::new(move_generator)),
        ];
        let transposition_table = TranspositionTable::new(config.table_capacity)?;

        Ok(Self::new(config.depth, phases, transposition_table))
    }

    /// Searches `state` to `depth` with the given window and returns its value for the side
    /// to move. The state is left exactly as it was passed in.
    #[must_use = "search returns the value of the position"]
    pub fn search(
        &mut self,
        state: &mut S,
        depth: u8,
        alpha: Score,
        beta: Score,
    ) -> Result<Score, SearchError> {
        let mut context = SearchContext {
            phases: &self.phases,
            transposition_table: &mut self.transposition_table,
            stats: &mut self.stats,
        };
        context.search(state, depth, Window::new(alpha, beta))
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.transposition_table
    }

    pub fn transposition_table_mut(&mut self) -> &mut TranspositionTable {
        &mut self.transposition_table
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Forgets every cached result and resets the statistics.
    pub fn clear(&mut self) {
        self.transposition_table.clear();
        self.stats.reset();
    }
}

impl<S: GameState> Evaluator<S> for AlphaBetaSearcher<S> {
    fn evaluate(&mut self, state: &mut S) -> Result<Score, SearchError> {
        debug!("alpha-beta search depth: {}", self.depth);
        self.reset_stats();

        let score = self.search(state, self.depth, Score::NEG_INFINITY, Score::INFINITY)?;

        debug!(
            "score {} after {} nodes ({} table cutoffs, {} beta cutoffs)",
            score, self.stats.nodes, self.stats.table_cutoffs, self.stats.beta_cutoffs
        );
        Ok(score)
    }
}
