//! Per-vendor statement parsers. Each one maps a vendor layout onto [`Transaction`].
//!
//! [`Transaction`]: cleaner_core::Transaction

pub mod bofa;
pub mod purchase_log;
pub mod santander;
pub mod usaa;

use std::io;
use std::path::Path;
use std::str::FromStr;

use cleaner_core::{CleanerError, Result};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

/// Deserialize every record of `rdr` into `T`, paired with its 1-based line number.
pub(crate) fn read_rows<R: io::Read, T: DeserializeOwned>(
    path: &Path,
    rdr: &mut csv::Reader<R>,
) -> Result<Vec<(u64, T)>> {
    let headers = rdr
        .headers()
        .map_err(|e| CleanerError::csv(path, e))?
        .clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| CleanerError::csv(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| CleanerError::malformed(path, Some(line), e.to_string()))?;
        rows.push((line, row));
    }
    Ok(rows)
}

/// Parse a plain decimal amount such as `-200.00`.
pub(crate) fn parse_amount(path: &Path, line: u64, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|_| {
        CleanerError::malformed(path, Some(line), format!("Amount is not a number: {raw:?}"))
    })
}
