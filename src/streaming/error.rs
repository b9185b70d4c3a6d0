use tracing::{error, warn};

use crate::engine::LedgerError;
use crate::io::IoError;

/// Policy for handling errors during stream processing
pub trait ErrorPolicy: Send + Sync {
    /// Handle an IO error (CSV parsing, reading)
    /// Return true to continue processing, false to abort
    fn handle_io_error(&self, error: IoError) -> bool;

    /// Handle a ledger error (rejected or failed operation)
    /// Return true to continue processing, false to abort
    fn handle_ledger_error(&self, error: LedgerError) -> bool;
}

/// Skip errors and continue processing, logging each one
pub struct SkipErrors;

impl ErrorPolicy for SkipErrors {
    fn handle_io_error(&self, error: IoError) -> bool {
        warn!(%error, "Skipping malformed operation");
        true
    }

    fn handle_ledger_error(&self, error: LedgerError) -> bool {
        if error.is_rejection() {
            warn!(%error, "Operation rejected");
        } else {
            error!(%error, "Operation failed");
        }
        true
    }
}

/// Abort on first error
pub struct AbortOnError;

impl ErrorPolicy for AbortOnError {
    fn handle_io_error(&self, error: IoError) -> bool {
        error!(%error, "Malformed operation, aborting");
        false
    }

    fn handle_ledger_error(&self, error: LedgerError) -> bool {
        error!(%error, "Operation failed, aborting");
        false
    }
}

/// Silent error policy - skip errors without logging
pub struct SilentSkip;

impl ErrorPolicy for SilentSkip {
    fn handle_io_error(&self, _error: IoError) -> bool {
        true
    }

    fn handle_ledger_error(&self, _error: LedgerError) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn skip_errors_continues_on_io_error() {
        let error = IoError::InvalidOperationType("test".to_string());
        assert!(SkipErrors.handle_io_error(error));
    }

    #[test]
    fn skip_errors_continues_on_ledger_error() {
        assert!(SkipErrors.handle_ledger_error(LedgerError::SourceNotFound(123)));
        assert!(SkipErrors.handle_ledger_error(LedgerError::RepositoryError(
            StorageError::Unavailable("down".to_string())
        )));
    }

    #[test]
    fn abort_on_error_stops_on_io_error() {
        let error = IoError::InvalidOperationType("test".to_string());
        assert!(!AbortOnError.handle_io_error(error));
    }

    #[test]
    fn abort_on_error_stops_on_ledger_error() {
        assert!(!AbortOnError.handle_ledger_error(LedgerError::BranchNotFound(3)));
    }

    #[test]
    fn silent_skip_continues() {
        assert!(SilentSkip.handle_io_error(IoError::MissingField("amount".to_string())));
        assert!(SilentSkip.handle_ledger_error(LedgerError::SameAccount(1)));
    }
}
