//! Nim command - value and best move for a pile.

use gametree::alpha_beta_searcher::{
    best_move, AlphaBetaSearcher, Evaluator, SearchConfig, SearchError,
    DEFAULT_TABLE_CAPACITY,
};
use gametree::games::nim::{NimEvaluator, NimMoveGenerator, NimState};
use structopt::StructOpt;

use super::{print_stats, Command};

#[derive(StructOpt)]
pub struct NimArgs {
    #[structopt(short, long)]
    pub pile: u8,
    #[structopt(short, long, default_value = "4")]
    pub depth: u8,
    #[structopt(long)]
    pub table_capacity: Option<usize>,
}

impl NimArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            depth: self.depth,
            table_capacity: self.table_capacity.unwrap_or(DEFAULT_TABLE_CAPACITY),
        }
    }
}

impl Command for NimArgs {
    fn execute(self) -> Result<(), SearchError> {
        let config = self.config();
        let mut searcher =
            AlphaBetaSearcher::with_standard_phases(config, NimMoveGenerator, NimEvaluator)?;
        let mut state = NimState::new(self.pile);

        let value = searcher.evaluate(&mut state)?;
        println!("pile {}: value {}", self.pile, value);
        print_stats(searcher.stats());

        match best_move(&mut searcher, &NimMoveGenerator, &mut state) {
            Ok((game_move, score)) => println!("best move: {} ({})", game_move, score),
            Err(SearchError::NoAvailableMoves) => println!("the pile is empty"),
            Err(err) => return Err(err),
        }
        Ok(())
    }
}
