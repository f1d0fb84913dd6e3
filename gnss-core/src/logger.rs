//! Severity levels for the driver's event log.
//!
//! The receiver protocol distinguishes four severities (INFO, WARNING, ERROR,
//! CRITICAL) while the `log` crate only has five (ERROR down to TRACE). We
//! map CRITICAL onto `log::Level::Error` with a marker so it can still be
//! told apart from an ordinary error by anyone scraping the log output.

use std::fmt;

/// Severity of a driver log entry, ordered least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Emit a driver log line at the given severity through the `log` facade.
///
/// `target` should be the owning component ("mode", "bit", "reconcile",
/// "codec", "link") so a downstream `env_logger` filter can isolate it.
pub fn log(severity: Severity, target: &str, message: &str) {
    match severity {
        Severity::Info => log::info!(target: "gnss", "[{target}] {message}"),
        Severity::Warning => log::warn!(target: "gnss", "[{target}] {message}"),
        Severity::Error => log::error!(target: "gnss", "[{target}] {message}"),
        Severity::Critical => log::error!(target: "gnss", "[{target}] CRITICAL: {message}"),
    }
}

/// Install the process-wide logger. Call once from `main`.
///
/// Grounded on the `env_logger` + `log` pairing used by Hubris's host-side
/// `debug-net-client` tool; `RUST_LOG` still controls verbosity per-target.
pub fn init() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .try_init();
}

#[macro_export]
macro_rules! log_info {
    ($target:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::Severity::Info, $target, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($target:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::Severity::Warning, $target, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($target:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::Severity::Error, $target, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_critical {
    ($target:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::Severity::Critical, $target, &format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_order_least_to_most_severe() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn display_matches_protocol_wording() {
        assert_eq!(Severity::Warning.to_string(), "WARNING");
        assert_eq!(Severity::Critical.to_string(), "CRITICAL");
    }
}
