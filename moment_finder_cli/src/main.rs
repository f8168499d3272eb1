mod cli;
mod commands;
mod errors;
mod logging;
mod thumbnail_render;

use clap::Parser;
use log::error;

use cli::{Cli, Command};

fn main() {
    std::process::exit(run())
}

fn run() -> i32 {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Command::Index { directory, recurse } => commands::index::run(&cli.db, directory, *recurse),
        Command::Search { image, threshold } => commands::search::run(&cli.db, image, *threshold),
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            error!("{err}");
            err.exit_code()
        }
    }
}
