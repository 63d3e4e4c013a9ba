//! Verbosity-to-log-level wiring shared by both binaries.
//!
//! One `-v` raises to debug, two or more to trace.

use log::LevelFilter;

pub fn level_for_verbosity(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbose_count: u8) {
    env_logger::Builder::new()
        .filter_level(level_for_verbosity(verbose_count))
        .format_timestamp(None)
        .init();
}
