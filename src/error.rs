//! Error types for the payment ledger.

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while building payments or feeding the store.
///
/// A failed call never leaves the store partially updated.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A required argument was absent or could not be interpreted
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A CSV row that cannot be turned into a payment
    #[error("Invalid payment at line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    /// Failed to open or read the input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(csv::Error),
}

impl From<csv::Error> for LedgerError {
    /// Read failures reported by the CSV reader become `Io`, keeping the
    /// underlying `io::ErrorKind`; everything else stays `Csv`.
    fn from(err: csv::Error) -> Self {
        let io_kind = match err.kind() {
            csv::ErrorKind::Io(io) => Some(io.kind()),
            _ => None,
        };

        match io_kind {
            Some(kind) => LedgerError::Io(std::io::Error::new(kind, err)),
            None => LedgerError::Csv(err),
        }
    }
}
