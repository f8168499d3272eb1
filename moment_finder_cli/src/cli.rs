use std::path::PathBuf;

use clap::{Parser, Subcommand};

use moment_finder::definitions::DEFAULT_SIMILARITY_THRESHOLD;

#[derive(Parser, Debug)]
#[command(name = "moment_finder", version, about = "Index and search a video library by perceptual frame similarity")]
pub struct Cli {
    /// Path to the fingerprint store.
    #[arg(long, global = true, default_value = "data.db")]
    pub db: PathBuf,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress informational logging; only warnings and errors are shown.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Index every video under a directory.
    Index {
        /// Directory to scan for video files.
        directory: PathBuf,

        /// Recurse into subdirectories.
        #[arg(long)]
        recurse: bool,
    },

    /// Search the store for frames similar to a query image.
    Search {
        /// Path to a still image to search for.
        image: PathBuf,

        /// Minimum similarity (0.0-1.0) for a result to be printed.
        #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: f64,
    },
}
