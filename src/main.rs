use std::process;

use structopt::StructOpt;

mod cli;
#[cfg(feature = "instrumentation")]
mod instrumentation;

use cli::commands::Command;
use cli::Gametree;

fn main() {
    env_logger::init();

    #[cfg(feature = "instrumentation")]
    instrumentation::init_tracing();

    let result = Gametree::from_args().execute();

    #[cfg(feature = "instrumentation")]
    instrumentation::print_timing_statistics();

    if let Err(err) = result {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
