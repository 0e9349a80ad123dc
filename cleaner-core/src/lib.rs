//! cleaner-core: canonical transaction record, currency units and the error taxonomy

pub mod error;
pub mod transaction;
pub mod unit;

pub use error::{CleanerError, Result};
pub use transaction::{Transaction, CANONICAL_HEADER};
pub use unit::Unit;
