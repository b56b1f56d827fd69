//! Glyphtrace CLI library.

pub mod cli;

use env_logger::Env;
use log::{LevelFilter, info};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "GLYPHTRACE_LOG";

/// Set up logging at `info`, overridable through [`LOG_ENV`].
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .parse_env(Env::new().filter(LOG_ENV))
        .init();
    info!("glyphtrace version: {}", env!("CARGO_PKG_VERSION"));
}
