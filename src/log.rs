// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

use std::fs::File;

use simplelog::{Config, LevelFilter, SimpleLogger, WriteLogger};

#[used]
#[cfg_attr(target_os = "linux", unsafe(link_section = ".init_array"))]
pub static INITIALIZE: extern "C" fn() = cryptobackend_log_init;

/// Maps the CRYPTOBACKEND_TRACE_LEVEL value to a level filter.
/// Unset means LevelFilter::Error, unknown values mean LevelFilter::Trace.
fn trace_level(value: Option<&str>) -> LevelFilter {
    match value {
        None => LevelFilter::Error,
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        Some(_) => LevelFilter::Trace,
    }
}

/// Initializes a simple logger for tracing purposes based on the values of
/// the environment variable CRYPTOBACKEND_TRACE:
/// - stdout -> logs to standard output
/// - file -> any other value is interpreted as a file name to log into
/// - NOT PRESENT -> No tracing is initialized
///
/// If the logger initialization encounters an error, (for example the log
/// file can't be opened) no tracing is available and no error is reported.
pub extern "C" fn cryptobackend_log_init() {
    let Ok(target) = std::env::var("CRYPTOBACKEND_TRACE") else {
        return;
    };
    let level =
        trace_level(std::env::var("CRYPTOBACKEND_TRACE_LEVEL").ok().as_deref());
    if target == "stdout" {
        let _ = SimpleLogger::init(level, Config::default());
        return;
    }
    if let Ok(file) = File::create(&target) {
        let _ = WriteLogger::init(level, Config::default(), file);
    }
}

#[test]
pub fn test_init() {
    cryptobackend_log_init();
}

#[test]
pub fn test_trace_level() {
    assert_eq!(trace_level(None), LevelFilter::Error);
    assert_eq!(trace_level(Some("warn")), LevelFilter::Warn);
    assert_eq!(trace_level(Some("off")), LevelFilter::Off);
    assert_eq!(trace_level(Some("bogus")), LevelFilter::Trace);
}
