//! Tic-tac-toe command - value and move ranking for a position.

use std::fmt;
use std::str::FromStr;

use gametree::alpha_beta_searcher::{
    rank_moves, AlphaBetaSearcher, Evaluator, GameState, SearchConfig, SearchError,
    DEFAULT_TABLE_CAPACITY,
};
use gametree::evaluate::{Blend, MoverRelative};
use gametree::games::tic_tac_toe::{self, Board, TicTacToeMoveGenerator};
use log::info;
use structopt::StructOpt;

use super::{print_stats, Command};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvaluatorKind {
    Material,
    Positional,
    Blend,
}

impl EvaluatorKind {
    fn build(self) -> Box<dyn Evaluator<Board>> {
        match self {
            EvaluatorKind::Material => {
                Box::new(MoverRelative::new(tic_tac_toe::material_evaluator()))
            }
            EvaluatorKind::Positional => {
                Box::new(MoverRelative::new(tic_tac_toe::positional_evaluator()))
            }
            EvaluatorKind::Blend => Box::new(
                Blend::<Board>::default()
                    .push(MoverRelative::new(tic_tac_toe::positional_evaluator()), 1.0)
                    .push(MoverRelative::new(tic_tac_toe::material_evaluator()), 2.0),
            ),
        }
    }
}

impl FromStr for EvaluatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "material" => Ok(EvaluatorKind::Material),
            "positional" => Ok(EvaluatorKind::Positional),
            "blend" => Ok(EvaluatorKind::Blend),
            other => Err(format!(
                "unknown evaluator `{}`, expected material, positional or blend",
                other
            )),
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvaluatorKind::Material => "material",
            EvaluatorKind::Positional => "positional",
            EvaluatorKind::Blend => "blend",
        };
        write!(f, "{}", name)
    }
}

#[derive(StructOpt)]
pub struct TicTacToeArgs {
    #[structopt(short, long, default_value = "......... x")]
    pub position: Board,
    #[structopt(short, long, default_value = "4")]
    pub depth: u8,
    #[structopt(long)]
    pub table_capacity: Option<usize>,
    #[structopt(short, long, default_value = "positional")]
    pub evaluator: EvaluatorKind,
}

impl TicTacToeArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            depth: self.depth,
            table_capacity: self.table_capacity.unwrap_or(DEFAULT_TABLE_CAPACITY),
        }
    }
}

impl Command for TicTacToeArgs {
    fn execute(self) -> Result<(), SearchError> {
        let config = self.config();
        info!("searching with the {} evaluator: {:?}", self.evaluator, config);

        let mut searcher = AlphaBetaSearcher::with_standard_phases(
            config,
            TicTacToeMoveGenerator,
            self.evaluator.build(),
        )?;
        let mut position = self.position;

        println!("{}", position);
        let value = searcher.evaluate(&mut position)?;
        println!("value: {}", value);
        print_stats(searcher.stats());

        if position.outcome().is_some() {
            println!("game over");
            return Ok(());
        }
        if self.depth == 0 {
            return Ok(());
        }

        let ranked = rank_moves(&mut searcher, &TicTacToeMoveGenerator, &mut position)?;
        for (game_move, score) in ranked {
            println!("  {} {}", game_move, score);
        }
        Ok(())
    }
}
