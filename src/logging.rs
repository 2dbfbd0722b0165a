use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialize the logger from CLI flags.
///
/// `RUST_LOG` takes precedence when set. Otherwise `quiet` limits output to
/// errors and each `-v` raises the level one step above the default `warn`.
/// Logs go to stderr so they never mix with the report on stdout.
pub fn init(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        builder.filter_level(level_for(verbose, quiet));
    }

    builder.format(|buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
    });

    // A second init (e.g. from tests) keeps the first logger
    let _ = builder.try_init();
}

fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
