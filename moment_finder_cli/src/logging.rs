use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

/// Initialize stderr structured logging at a level derived from the CLI's
/// `-v`/`-q` flags. Result data is printed separately to stdout so the two
/// streams can be split by shell redirection.
pub fn init(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    let config = ConfigBuilder::new().build();

    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
        .expect("TermLogger failed to initialize");
}
