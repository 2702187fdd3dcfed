//! CLI argument parsing using StructOpt.

use gametree::alpha_beta_searcher::SearchError;
use structopt::StructOpt;

use crate::cli::commands::{nim::NimArgs, tic_tac_toe::TicTacToeArgs};

#[derive(StructOpt)]
#[structopt(
    name = "gametree",
    about = "Alpha-beta game tree search over small two-player games"
)]
pub enum Gametree {
    #[structopt(
        name = "tic-tac-toe",
        about = "Search a tic-tac-toe position given with `--position` (default: empty board) to the given `--depth` (default: 4). Prints the position value, every legal move ranked best first, and search statistics. The horizon evaluator is chosen with `--evaluator` (material, positional or blend; default: positional)."
    )]
    TicTacToe(TicTacToeArgs),
    #[structopt(
        name = "nim",
        about = "Search a Nim pile of `--pile` objects to the given `--depth` (default: 4) and print its value and the best move."
    )]
    Nim(NimArgs),
}

impl crate::cli::commands::Command for Gametree {
    fn execute(self) -> Result<(), SearchError> {
        match self {
            Self::TicTacToe(cmd) => cmd.execute(),
            Self::Nim(cmd) => cmd.execute(),
        }
    }
}
