//! Minimal `log` backend: messages go to stderr as `LEVEL: message`.
//!
//! The level comes from `SCIDREAD_LOG` (`off`, `error`, `warn`, `info`,
//! `debug`, `trace`; default `warn`), raised one step per `-v` flag.

use std::env;

use log::{LevelFilter, Log, Metadata, Record};

pub const LOG_ENV: &str = "SCIDREAD_LOG";

const LEVELS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

pub struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

pub fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_lowercase().as_str() {
        "off" | "none" => Some(LevelFilter::Off),
        "error" | "err" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// `level` raised by `steps`, capped at trace
pub fn raise(level: LevelFilter, steps: u8) -> LevelFilter {
    let current = LEVELS.iter().position(|&l| l == level).unwrap_or(2);
    LEVELS[(current + steps as usize).min(LEVELS.len() - 1)]
}

pub fn level_from_env() -> LevelFilter {
    env::var(LOG_ENV)
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(LevelFilter::Warn)
}

/// Install the stderr logger. A second call leaves the first logger in place.
pub fn init(verbosity: u8) {
    let level = raise(level_from_env(), verbosity);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
