//! cleaner-ingest: statement layout detection, per-vendor parsers and the aggregator
//! that merges them into one canonical table.

pub mod aggregate;
pub mod convert;
pub mod detect;
pub mod parsers;
pub mod types;

pub use aggregate::Aggregator;
pub use convert::{Converter, Passthrough, SofficeConverter};
pub use detect::{classify, detect, sniff};
pub use parsers::purchase_log::{LogLayout, LoggedPurchase};
pub use types::SourceKind;
