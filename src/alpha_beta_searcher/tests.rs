//! Game-agnostic tests for the alpha-beta searcher, driven by Nim and tic-tac-toe.
//!
//! Test coverage:
//! - Exact values (solved Nim piles, terminal positions, horizon scores)
//! - Agreement with plain minimax across positions, depths and table sizes
//! - Transposition tables (window narrowing, cutoffs, stored depth, idempotent re-search)
//! - State restoration (after success, after a failed move, after a panic)
//! - Undo failures and which error wins when both apply and undo fail
//! - Pipelines (nested searchers, a pipeline without a horizon)
//! - Statistics and pruning
//! - Root move ranking

use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use thiserror::Error;

use super::*;
use crate::evaluate::{Blend, MoverRelative};
use crate::games::nim::{NimError, NimEvaluator, NimMove, NimMoveGenerator, NimState};
use crate::games::tic_tac_toe::{
    self, Board, TicTacToeMove, TicTacToeMoveGenerator, TicTacToeMoveList,
};

fn board(notation: &str) -> Board {
    notation.parse().unwrap()
}

fn nim_searcher(depth: u8) -> AlphaBetaSearcher<NimState> {
    let config = SearchConfig {
        depth,
        ..SearchConfig::default()
    };
    AlphaBetaSearcher::with_standard_phases(config, NimMoveGenerator, NimEvaluator).unwrap()
}

fn tic_tac_toe_searcher(depth: u8, table_capacity: usize) -> AlphaBetaSearcher<Board> {
    let config = SearchConfig {
        depth,
        table_capacity,
    };
    AlphaBetaSearcher::with_standard_phases(
        config,
        TicTacToeMoveGenerator,
        MoverRelative::new(tic_tac_toe::positional_evaluator()),
    )
    .unwrap()
}

/// Unpruned negamax without a table. Counts visited nodes in `nodes`.
fn minimax<S, G, E>(
    state: &mut S,
    depth: u8,
    move_generator: &G,
    evaluator: &mut E,
    nodes: &mut usize,
) -> Score
where
    S: GameState,
    G: MoveGenerator<S>,
    E: Evaluator<S>,
{
    *nodes += 1;
    if let Some(outcome) = state.outcome() {
        return outcome.score();
    }
    if depth == 0 {
        return evaluator.evaluate(state).unwrap();
    }

    let moves = move_generator.generate_moves(state);
    let mut best = Score::NEG_INFINITY;
    for game_move in moves.as_ref().iter() {
        game_move.apply(state).unwrap();
        let score = -minimax(state, depth - 1, move_generator, evaluator, nodes);
        game_move.undo(state).unwrap();
        best = best.max(score);
    }
    best
}

const POSITIONS: [&str; 6] = [
    "......... x",
    "X...O.... x",
    "XO..X.... o",
    "X.O.O.X.. x",
    "XX.OO.... x",
    ".X..O..X. o",
];

#[test]
fn test_nim_piles_are_solved_at_full_depth() {
    for pile in 1..=12 {
        let mut searcher = nim_searcher(12);
        let mut state = NimState::new(pile);
        let score = searcher.evaluate(&mut state).unwrap();

        let expected = if pile % 4 == 0 {
            Score::NEG_INFINITY
        } else {
            Score::INFINITY
        };
        assert_eq!(score, expected, "pile {} should be solved as {}", pile, expected);
    }
}

#[test]
fn test_depth_zero_returns_horizon_score() {
    let mut searcher = nim_searcher(0);
    assert_eq!(searcher.evaluate(&mut NimState::new(5)).unwrap(), 1.0);
    assert_eq!(searcher.evaluate(&mut NimState::new(8)).unwrap(), -1.0);

    let mut evaluator = MoverRelative::new(tic_tac_toe::positional_evaluator());
    let mut searcher = tic_tac_toe_searcher(0, 64);
    for notation in POSITIONS.iter() {
        let mut position = board(notation);
        let expected = evaluator.evaluate(&mut position).unwrap();
        assert_eq!(
            searcher.evaluate(&mut position).unwrap(),
            expected,
            "depth 0 search of {} should equal the static score",
            notation
        );
    }
    assert_eq!(searcher.stats().horizon_evaluations(), 1);
}

#[test]
fn test_terminal_positions_score_exactly_at_any_depth() {
    let cases = [
        ("XXXOO.... o", Score::NEG_INFINITY),
        ("OOOXX.X.. x", Score::NEG_INFINITY),
        ("XOXXOOOXX o", 0.0),
    ];

    for (notation, expected) in cases.iter() {
        for depth in [0, 1, 3].iter() {
            let mut searcher = tic_tac_toe_searcher(*depth, 64);
            let mut position = board(notation);
            assert_eq!(
                searcher.evaluate(&mut position).unwrap(),
                *expected,
                "{} at depth {}",
                notation,
                depth
            );
            assert_eq!(searcher.stats().terminal_nodes(), 1);
            assert_eq!(searcher.stats().nodes(), 1);
        }
    }
}

#[test]
fn test_agrees_with_minimax() {
    for notation in POSITIONS.iter() {
        for depth in 1..=4 {
            for &capacity in [7, DEFAULT_TABLE_CAPACITY].iter() {
                let mut position = board(notation);
                let mut evaluator = MoverRelative::new(tic_tac_toe::positional_evaluator());
                let mut nodes = 0;
                let expected = minimax(
                    &mut position,
                    depth,
                    &TicTacToeMoveGenerator,
                    &mut evaluator,
                    &mut nodes,
                );

                let mut searcher = tic_tac_toe_searcher(depth, capacity);
                assert_eq!(
                    searcher.evaluate(&mut position).unwrap(),
                    expected,
                    "{} at depth {} with capacity {}",
                    notation,
                    depth,
                    capacity
                );
            }
        }
    }
}

#[test]
fn test_agrees_with_minimax_using_blended_evaluator() {
    let blended = || {
        Blend::<Board>::default()
            .push(MoverRelative::new(tic_tac_toe::positional_evaluator()), 1.0)
            .push(MoverRelative::new(tic_tac_toe::material_evaluator()), 0.5)
    };

    for notation in POSITIONS.iter() {
        let mut position = board(notation);
        let mut evaluator: Blend<Board> = blended();
        let mut nodes = 0;
        let expected = minimax(
            &mut position,
            3,
            &TicTacToeMoveGenerator,
            &mut evaluator,
            &mut nodes,
        );

        let config = SearchConfig {
            depth: 3,
            table_capacity: 1024,
        };
        let mut searcher =
            AlphaBetaSearcher::with_standard_phases(config, TicTacToeMoveGenerator, blended())
                .unwrap();
        assert_eq!(searcher.evaluate(&mut position).unwrap(), expected, "{}", notation);
    }
}

#[test]
fn test_empty_board_is_a_draw_with_pruning() {
    let mut searcher = tic_tac_toe_searcher(9, DEFAULT_TABLE_CAPACITY);
    let mut position = Board::new();

    assert_eq!(searcher.evaluate(&mut position).unwrap(), 0.0);

    let stats = *searcher.stats();
    assert!(stats.beta_cutoffs() > 0, "full search should prune");
    assert!(stats.table_cutoffs() > 0, "transpositions should be reused");
    assert!(stats.terminal_nodes() > 0);
    assert_eq!(stats.horizon_evaluations(), 0, "every leaf is a finished game");
    // An unpruned tree from the empty board has 549_946 nodes.
    assert!(stats.nodes() < 549_946);
}

#[test]
fn test_search_visits_fewer_nodes_than_minimax() {
    let mut position = Board::new();
    let mut evaluator = MoverRelative::new(tic_tac_toe::positional_evaluator());
    let mut minimax_nodes = 0;
    minimax(
        &mut position,
        4,
        &TicTacToeMoveGenerator,
        &mut evaluator,
        &mut minimax_nodes,
    );

    let mut searcher = tic_tac_toe_searcher(4, DEFAULT_TABLE_CAPACITY);
    searcher.evaluate(&mut position).unwrap();
    assert!(
        searcher.stats().nodes() < minimax_nodes,
        "{} nodes searched, minimax needed {}",
        searcher.stats().nodes(),
        minimax_nodes
    );
}

#[test]
fn test_immediate_win_is_found() {
    for depth in 1..=3 {
        let mut searcher = tic_tac_toe_searcher(depth, 64);
        let mut position = board("XX.OO.... x");
        assert_eq!(
            searcher.evaluate(&mut position).unwrap(),
            Score::INFINITY,
            "X completes the top row at depth {}",
            depth
        );
    }
}

#[test]
fn test_search_is_idempotent_and_stores_root_at_search_depth() {
    let mut searcher = tic_tac_toe_searcher(3, DEFAULT_TABLE_CAPACITY);
    let mut position = board("X...O.... x");

    let first = searcher.evaluate(&mut position).unwrap();
    let root = searcher
        .transposition_table()
        .get(position.position_hash())
        .unwrap();
    assert_eq!(root.depth(), 3);

    let second = searcher.evaluate(&mut position).unwrap();
    assert_eq!(first, second);
    assert_eq!(searcher.stats().nodes(), 1, "second search is answered by the table");
    assert_eq!(searcher.stats().table_cutoffs(), 1);
}

#[test]
fn test_clear_forgets_cached_results() {
    let mut searcher = tic_tac_toe_searcher(2, 64);
    let mut position = board("X...O.... x");
    let score = searcher.evaluate(&mut position).unwrap();

    searcher.clear();
    assert!(searcher.transposition_table().is_empty());
    assert_eq!(searcher.stats().nodes(), 0);
    assert_eq!(searcher.evaluate(&mut position).unwrap(), score);
    assert!(searcher.stats().nodes() > 1);
}

#[test]
fn test_position_is_restored_after_search() {
    for notation in POSITIONS.iter() {
        let mut position = board(notation);
        let before = position.clone();
        let mut searcher = tic_tac_toe_searcher(4, 256);
        searcher.evaluate(&mut position).unwrap();
        assert_eq!(position, before);
        assert_eq!(position.position_hash(), before.position_hash());
    }

    let mut state = NimState::new(9);
    nim_searcher(9).evaluate(&mut state).unwrap();
    assert_eq!(state, NimState::new(9));
}

/// Legal moves followed by one move that can never be applied.
struct FaultyMoveGenerator;

impl MoveGenerator<Board> for FaultyMoveGenerator {
    type Move = TicTacToeMove;
    type MoveList = TicTacToeMoveList;

    fn generate_moves(&self, state: &mut Board) -> TicTacToeMoveList {
        let mut moves = TicTacToeMoveGenerator.generate_moves(state);
        if !moves.is_empty() {
            moves.push(TicTacToeMove::new(9));
        }
        moves
    }
}

#[test]
fn test_failed_move_propagates_and_restores_position() {
    let config = SearchConfig {
        depth: 3,
        table_capacity: 256,
    };
    let mut searcher = AlphaBetaSearcher::with_standard_phases(
        config,
        FaultyMoveGenerator,
        MoverRelative::new(tic_tac_toe::positional_evaluator()),
    )
    .unwrap();

    let mut position = board("X...O.... x");
    let before = position.clone();
    let result = searcher.evaluate(&mut position);

    match result {
        Err(SearchError::MoveApplication { game_move, .. }) => {
            assert!(game_move.contains('9'), "unexpected move {}", game_move)
        }
        other => panic!("expected a move application error, got {:?}", other),
    }
    assert_eq!(position, before);
}

/// Scores every position 0 until its budget runs out, then panics.
struct PanickingEvaluator {
    remaining: usize,
}

impl Evaluator<Board> for PanickingEvaluator {
    fn evaluate(&mut self, _state: &mut Board) -> Result<Score, SearchError> {
        if self.remaining == 0 {
            panic!("evaluator budget exhausted");
        }
        self.remaining -= 1;
        Ok(0.0)
    }
}

#[test]
fn test_panic_mid_search_restores_position() {
    let config = SearchConfig {
        depth: 3,
        table_capacity: 256,
    };
    let mut searcher = AlphaBetaSearcher::with_standard_phases(
        config,
        TicTacToeMoveGenerator,
        PanickingEvaluator { remaining: 3 },
    )
    .unwrap();

    let mut position = board("X...O.... x");
    let before = position.clone();

    let outcome = catch_unwind(AssertUnwindSafe(|| searcher.evaluate(&mut position)));
    assert!(outcome.is_err(), "the evaluator should have panicked");
    assert_eq!(position, before);
}

impl Evaluator<NimState> for PanickingEvaluator {
    fn evaluate(&mut self, _state: &mut NimState) -> Result<Score, SearchError> {
        if self.remaining == 0 {
            panic!("evaluator budget exhausted");
        }
        self.remaining -= 1;
        Ok(0.0)
    }
}

#[derive(Error, Debug)]
enum StickyTakeError {
    #[error(transparent)]
    Rules(#[from] NimError),
    #[error("undo refused")]
    UndoRefused,
}

/// A Nim take that applies normally but can never be taken back.
#[derive(Clone, Debug, PartialEq)]
struct StickyTake {
    take: u8,
}

impl GameMove for StickyTake {
    type State = NimState;
    type Error = StickyTakeError;

    fn apply(&self, state: &mut NimState) -> Result<(), StickyTakeError> {
        NimMove { take: self.take }.apply(state)?;
        Ok(())
    }

    fn undo(&self, _state: &mut NimState) -> Result<(), StickyTakeError> {
        Err(StickyTakeError::UndoRefused)
    }
}

/// Offers a single take of 1 at the root pile and `deeper_take` below it.
struct StickyTakeGenerator {
    root_pile: u8,
    deeper_take: u8,
}

impl MoveGenerator<NimState> for StickyTakeGenerator {
    type Move = StickyTake;
    type MoveList = Vec<StickyTake>;

    fn generate_moves(&self, state: &mut NimState) -> Vec<StickyTake> {
        let take = if state.pile() == self.root_pile {
            1
        } else {
            self.deeper_take
        };
        vec![StickyTake { take }]
    }
}

fn sticky_searcher<E>(
    depth: u8,
    deeper_take: u8,
    evaluator: E,
) -> AlphaBetaSearcher<NimState>
where
    E: Evaluator<NimState> + 'static,
{
    let config = SearchConfig {
        depth,
        table_capacity: 64,
    };
    let generator = StickyTakeGenerator {
        root_pile: 5,
        deeper_take,
    };
    AlphaBetaSearcher::with_standard_phases(config, generator, evaluator).unwrap()
}

#[test]
fn test_failed_undo_is_reported() {
    let mut searcher = sticky_searcher(1, 1, NimEvaluator);
    let mut state = NimState::new(5);

    match searcher.evaluate(&mut state) {
        Err(SearchError::MoveUndo { game_move, source }) => {
            assert!(game_move.contains("StickyTake"), "unexpected move {}", game_move);
            assert!(matches!(
                source.downcast_ref::<StickyTakeError>(),
                Some(StickyTakeError::UndoRefused)
            ));
        }
        other => panic!("expected an undo error, got {:?}", other),
    }
}

#[test]
fn test_subtree_error_wins_over_failed_undo() {
    // Take 1 from 5, then an impossible take of 9 one ply deeper.
    let mut searcher = sticky_searcher(2, 9, NimEvaluator);
    let mut state = NimState::new(5);

    match searcher.evaluate(&mut state) {
        Err(SearchError::MoveApplication { game_move, .. }) => {
            assert!(game_move.contains('9'), "unexpected move {}", game_move)
        }
        other => panic!("expected a move application error, got {:?}", other),
    }
}

#[test]
fn test_failed_undo_while_unwinding_does_not_abort() {
    let mut searcher = sticky_searcher(1, 1, PanickingEvaluator { remaining: 0 });
    let mut state = NimState::new(5);

    let outcome = catch_unwind(AssertUnwindSafe(|| searcher.evaluate(&mut state)));
    assert!(outcome.is_err(), "the evaluator should have panicked");
    // The take could not be undone, so it is still on the board.
    assert_eq!(state.pile(), 4);
}

/// Resolves every node to the same value.
struct FixedValue(Score);

impl NodePhase<Board> for FixedValue {
    fn evaluate(
        &self,
        _context: &mut SearchContext<'_, Board>,
        _state: &mut Board,
        _depth: u8,
        _window: Window,
    ) -> Result<PhaseResult, SearchError> {
        Ok(PhaseResult::resolved(self.0))
    }
}

#[test]
fn test_value_equal_to_alpha_is_stored_as_upper_bound() {
    let phases: Vec<Box<dyn NodePhase<Board>>> = vec![Box::new(FixedValue(0.0))];
    let mut searcher = AlphaBetaSearcher::new(2, phases, TranspositionTable::new(64).unwrap());
    let mut position = board("X...O.... x");
    let hash = position.position_hash();

    let cases = [
        (0.0, 5.0, NodeType::All),
        (-1.0, 5.0, NodeType::Pv),
        (-5.0, 0.0, NodeType::Cut),
    ];
    for &(alpha, beta, expected) in cases.iter() {
        assert_eq!(searcher.search(&mut position, 2, alpha, beta).unwrap(), 0.0);

        let record = searcher
            .transposition_table()
            .get(hash)
            .and_then(TableEntry::record)
            .copied()
            .unwrap();
        assert_eq!(record.node_type, expected, "window ({}, {})", alpha, beta);
        assert_eq!(record.score, 0.0);
    }
}

#[test]
fn test_nested_searcher_as_horizon_evaluator() {
    for notation in POSITIONS.iter() {
        let inner = tic_tac_toe_searcher(2, 1024);
        let config = SearchConfig {
            depth: 1,
            table_capacity: 1024,
        };
        let mut outer =
            AlphaBetaSearcher::with_standard_phases(config, TicTacToeMoveGenerator, inner)
                .unwrap();
        let mut direct = tic_tac_toe_searcher(3, 1024);

        let mut position = board(notation);
        assert_eq!(
            outer.evaluate(&mut position).unwrap(),
            direct.evaluate(&mut position).unwrap(),
            "depth 1 over depth 2 should match depth 3 for {}",
            notation
        );
    }
}

#[test]
fn test_pipeline_without_horizon_reports_exhausted_depth() {
    let phases: Vec<Box<dyn NodePhase<Board>>> = vec![
        Box::new(TerminalOutcome),
        Box::new(Expansion::new(TicTacToeMoveGenerator)),
    ];
    let mut searcher = AlphaBetaSearcher::new(2, phases, TranspositionTable::new(64).unwrap());

    let mut position = board("X...O.... x");
    let before = position.clone();
    assert!(matches!(
        searcher.evaluate(&mut position),
        Err(SearchError::DepthExhausted)
    ));
    assert_eq!(position, before);

    // Finished games never reach the expansion.
    let mut finished = board("XXXOO.... o");
    assert_eq!(searcher.evaluate(&mut finished).unwrap(), Score::NEG_INFINITY);
}

/// Records the window it is handed and passes it on untouched.
struct RecordWindow {
    seen: Rc<RefCell<Vec<Window>>>,
}

impl NodePhase<Board> for RecordWindow {
    fn evaluate(
        &self,
        _context: &mut SearchContext<'_, Board>,
        _state: &mut Board,
        _depth: u8,
        window: Window,
    ) -> Result<PhaseResult, SearchError> {
        self.seen.borrow_mut().push(window);
        Ok(PhaseResult::pass(window))
    }
}

/// Searches `position` at depth 3 in the window (0, 5) after seeding the table, returning
/// the result, the windows that reached the phase after the lookup, and the stats.
fn lookup_with(
    record_depth: u8,
    score: Score,
    node_type: NodeType,
) -> (Score, Vec<Window>, SearchStats) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let phases: Vec<Box<dyn NodePhase<Board>>> = vec![
        Box::new(TranspositionLookup),
        Box::new(RecordWindow { seen: seen.clone() }),
    ];
    let mut searcher = AlphaBetaSearcher::new(3, phases, TranspositionTable::new(64).unwrap());

    let mut position = board("X...O.... x");
    searcher.transposition_table_mut().store(
        position.position_hash(),
        record_depth,
        score,
        node_type,
    );

    let value = searcher.search(&mut position, 3, 0.0, 5.0).unwrap();
    let windows = seen.borrow().clone();
    (value, windows, *searcher.stats())
}

#[test]
fn test_lookup_cut_record_raises_alpha() {
    let (_, windows, stats) = lookup_with(3, 2.0, NodeType::Cut);
    assert_eq!(windows, vec![Window::new(2.0, 5.0)]);
    assert_eq!(stats.table_cutoffs(), 0);
}

#[test]
fn test_lookup_all_record_lowers_beta() {
    let (_, windows, _) = lookup_with(4, 2.0, NodeType::All);
    assert_eq!(windows, vec![Window::new(0.0, 2.0)]);
}

#[test]
fn test_lookup_pv_record_resolves_node() {
    let (value, windows, stats) = lookup_with(3, 2.0, NodeType::Pv);
    assert_eq!(value, 2.0);
    assert!(windows.is_empty(), "later phases must not run");
    assert_eq!(stats.table_cutoffs(), 1);
}

#[test]
fn test_lookup_bound_outside_window_resolves_node() {
    let (value, windows, stats) = lookup_with(3, 6.0, NodeType::Cut);
    assert_eq!(value, 6.0);
    assert!(windows.is_empty());
    assert_eq!(stats.table_cutoffs(), 1);

    let (value, windows, _) = lookup_with(3, -1.0, NodeType::All);
    assert_eq!(value, -1.0);
    assert!(windows.is_empty());
}

#[test]
fn test_lookup_ignores_shallower_record() {
    let (value, windows, stats) = lookup_with(2, 2.0, NodeType::Pv);
    assert_eq!(windows, vec![Window::new(0.0, 5.0)]);
    assert_eq!(stats.table_cutoffs(), 0);
    // Nothing resolved the node.
    assert_eq!(value, Score::NEG_INFINITY);
}

#[test]
fn test_rank_moves_orders_best_first() {
    let mut searcher = tic_tac_toe_searcher(2, 256);
    let mut position = board("XX.OO.... x");

    let ranked = rank_moves(&mut searcher, &TicTacToeMoveGenerator, &mut position).unwrap();
    assert_eq!(ranked.len(), 5);
    assert_eq!(ranked[0], (TicTacToeMove::new(2), Score::INFINITY));
    assert_eq!(ranked[1].0, TicTacToeMove::new(5), "blocking is the only move that survives");
    assert!(ranked[1].1.is_finite());
    assert!(ranked[2..]
        .iter()
        .all(|(_, score)| *score == Score::NEG_INFINITY));
    assert_eq!(position, board("XX.OO.... x"));
}

#[test]
fn test_rank_moves_keeps_generator_order_for_ties() {
    let mut searcher = nim_searcher(8);
    let mut state = NimState::new(4);

    let ranked = rank_moves(&mut searcher, &NimMoveGenerator, &mut state).unwrap();
    let takes: Vec<u8> = ranked.iter().map(|(game_move, _)| game_move.take).collect();
    assert_eq!(takes, vec![1, 2, 3]);
    assert!(ranked
        .iter()
        .all(|(_, score)| *score == Score::NEG_INFINITY));
}

#[test]
fn test_best_move_wins_nim() {
    for pile in [5u8, 6, 7, 9].iter() {
        let mut searcher = nim_searcher(10);
        let mut state = NimState::new(*pile);

        let (game_move, score) = best_move(&mut searcher, &NimMoveGenerator, &mut state).unwrap();
        assert_eq!(game_move, NimMove { take: pile % 4 });
        assert_eq!(score, Score::INFINITY);
        assert_eq!(state, NimState::new(*pile));
    }
}

#[test]
fn test_ranking_requires_depth() {
    let mut searcher = nim_searcher(0);
    assert!(matches!(
        rank_moves(&mut searcher, &NimMoveGenerator, &mut NimState::new(5)),
        Err(SearchError::DepthTooLow)
    ));
}

#[test]
fn test_best_move_without_moves() {
    let mut searcher = tic_tac_toe_searcher(2, 64);
    let mut finished = board("XXXOO.... o");
    assert!(matches!(
        best_move(&mut searcher, &TicTacToeMoveGenerator, &mut finished),
        Err(SearchError::NoAvailableMoves)
    ));
}

#[test]
fn test_window_helpers() {
    let window = Window::new(-1.0, 3.0);
    assert_eq!(window.negated(), Window::new(-3.0, 1.0));
    assert!(!window.is_resolved());
    assert!(Window::collapsed(2.0).is_resolved());
    assert_eq!(Window::FULL.negated(), Window::FULL);
}
