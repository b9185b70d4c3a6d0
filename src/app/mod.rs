pub mod cli;
pub mod error;

// Re-export commonly used types
pub use cli::{CliApp, LOG_LEVEL_ENV};
pub use error::AppError;
