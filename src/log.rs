use std::str::FromStr;
use std::sync::Mutex;

use slog::Drain;
use slog::{Fuse, Level, LevelFilter};
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Logger};

use crate::info as build;

/// Builds the root logger, writing JSON lines to stderr and dropping
/// anything below `level` (any name `slog` understands, such as
/// `"debug"` or `"warn"`). Unknown names fall back to `info`.
pub fn initialize_logger(level: &str) -> Logger {
    let level = Level::from_str(level).unwrap_or(Level::Info);

    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = LevelFilter::new(drain, level).fuse();
    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!("version" => build::VERSION, "revision" => build::REVISION, "build_timestamp" => build::BUILD_TIMESTAMP),
    )
}

/// A logger that swallows everything, for tests and helpers.
pub fn discard() -> Logger {
    Logger::root(slog::Discard, o!())
}
