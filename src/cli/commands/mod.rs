//! CLI command implementations.

use gametree::alpha_beta_searcher::{SearchError, SearchStats};

pub trait Command {
    fn execute(self) -> Result<(), SearchError>;
}

pub mod nim;
pub mod tic_tac_toe;

pub(crate) fn print_stats(stats: &SearchStats) {
    println!(
        "nodes: {}, table cutoffs: {}, beta cutoffs: {}, terminal: {}, horizon: {}",
        stats.nodes(),
        stats.table_cutoffs(),
        stats.beta_cutoffs(),
        stats.terminal_nodes(),
        stats.horizon_evaluations()
    );
}
