use thiserror::Error;

use crate::io::IoError;

/// Top-level application errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("CSV IO error: {0}")]
    CsvIo(#[from] IoError),

    #[error("Processing aborted after {0} operations")]
    Aborted(usize),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}
