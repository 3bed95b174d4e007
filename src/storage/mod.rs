mod error;
mod store;

pub use error::*;
pub use store::*;

/// Default location of the ledger document, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data/database.json";
