//! Dump Analysis Logging
//!
//! Population passes over an [`ObjectTable`](crate::table::ObjectTable)
//! report what they do as [`DumpEvent`]s, which are rendered through the
//! `log` facade. Installing a logger is up to the application.
//!
//! Log Levels:
//! - INFO: pass start/end
//! - DEBUG: progress, interning statistics

use std::fmt;

/// Target used for every event emitted by this crate
pub const LOG_TARGET: &str = "heapobj";

/// Dump analysis event types
#[derive(Debug, Clone, PartialEq)]
pub enum DumpEvent {
    /// A pass over the table started
    PassStart { pass: &'static str, total: usize },

    /// A pass reached record `done` of `total`
    PassProgress {
        pass: &'static str,
        done: usize,
        total: usize,
    },

    /// A pass finished
    PassEnd {
        pass: &'static str,
        total: usize,
        changed: usize,
        duration_ms: f64,
    },

    /// Type-label registry statistics
    InternStats {
        labels: usize,
        hits: usize,
        misses: usize,
    },
}

impl DumpEvent {
    /// Get log level for event
    pub fn level(&self) -> log::Level {
        match self {
            DumpEvent::PassStart { .. } | DumpEvent::PassEnd { .. } => log::Level::Info,
            DumpEvent::PassProgress { .. } | DumpEvent::InternStats { .. } => log::Level::Debug,
        }
    }
}

impl fmt::Display for DumpEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpEvent::PassStart { pass, total } => {
                write!(f, "[dump] {} started over {} objects", pass, total)
            }
            DumpEvent::PassProgress { pass, done, total } => {
                write!(f, "[dump] {} {:8} / {:8}", pass, done, total)
            }
            DumpEvent::PassEnd {
                pass,
                total,
                changed,
                duration_ms,
            } => write!(
                f,
                "[dump] {} finished: {} objects, {} changed in {:.1}ms",
                pass, total, changed, duration_ms
            ),
            DumpEvent::InternStats {
                labels,
                hits,
                misses,
            } => write!(
                f,
                "[dump] interned {} type labels ({} hits, {} misses)",
                labels, hits, misses
            ),
        }
    }
}

/// Log an event
pub fn emit(event: &DumpEvent) {
    log::log!(target: LOG_TARGET, event.level(), "{}", event);
}

/// Emit a progress event when `idx` lands on the reporting interval
///
/// `interval` must be a power of two.
pub(crate) fn progress(enabled: bool, interval: usize, pass: &'static str, idx: usize, total: usize) {
    if enabled && idx & (interval - 1) == 0 {
        emit(&DumpEvent::PassProgress {
            pass,
            done: idx,
            total,
        });
    }
}
