//! Error kinds shared across the wire codec, reconciliation engine and mode
//! orchestrator. None of these is fatal to the process by itself — see
//! `DriverError::is_fatal` and the propagation policy in the driver crate's
//! mode orchestrator, which is the only component allowed to act on a
//! `DriverError` by transitioning to `Mode::Failure`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("serial transport error: {0}")]
    Transport(String),

    #[error("checksum mismatch on frame, {count} total so far")]
    ChecksumMismatch { count: u64 },

    #[error("unknown class/id 0x{class:02x}:0x{id:02x}")]
    UnknownFrame { class: u8, id: u8 },

    #[error("timed out waiting for {what} after {elapsed_ms} ms")]
    ProtocolTimeout { what: String, elapsed_ms: u64 },

    #[error("{what} version {got} is below the minimum {min}")]
    VersionBelowMinimum {
        what: String,
        got: String,
        min: String,
    },

    #[error("receiver reported an error: {0}")]
    ReceiverReportedError(String),

    #[error("operator requested IBIT")]
    OperatorAbort,
}

impl DriverError {
    /// Whether this error kind, on its own, should ever be allowed to
    /// propagate into a process-level abort. Per the error-handling design,
    /// the answer is always no: only the mode orchestrator may escalate to
    /// `Mode::Failure`, and it does so by timeout or BIT result, never by
    /// unwinding on a `DriverError`.
    pub fn is_fatal(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_driver_error_is_fatal() {
        let errs = [
            DriverError::Transport("closed".into()),
            DriverError::ChecksumMismatch { count: 1 },
            DriverError::UnknownFrame { class: 0x0a, id: 0xff },
            DriverError::ProtocolTimeout { what: "MonVer".into(), elapsed_ms: 10_000 },
            DriverError::VersionBelowMinimum {
                what: "SPG".into(),
                got: "4.03".into(),
                min: "4.04".into(),
            },
            DriverError::ReceiverReportedError("tx alloc error".into()),
            DriverError::OperatorAbort,
        ];
        assert!(errs.iter().all(|e| !e.is_fatal()));
    }
}
