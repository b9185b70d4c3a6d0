pub mod csv_reader;
pub mod csv_writer;
pub mod error;
pub mod parse;
pub mod seed;

// Re-export commonly used types
pub use csv_reader::{CsvAccountStream, CsvOperationStream};
pub use csv_writer::write_snapshot;
pub use error::IoError;
pub use parse::{RawAccountRecord, RawOperationRecord};
pub use seed::{load_accounts, load_accounts_from_file};
