pub mod concurrent;
pub mod error;
pub mod query;
pub mod traits;

// Re-export commonly used types
pub use concurrent::ConcurrentAccountRepository;
pub use error::StorageError;
pub use query::{AccountFilter, Extremum, SortOrder};
pub use traits::AccountRepository;
