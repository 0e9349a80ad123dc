//! USAA checking/credit CSV export.
//!
//! Layout:
//!   Date,Description,Original Description,Category,Amount,Status
//!   2024-01-03,Amazon,AMAZON MKTPL*AB12,Shopping,-30.00,Posted
//!
//! Debits are negative. Internal transfers ("USAA Transfer") are not purchases and are
//! dropped along with deposits.

use std::path::Path;

use cleaner_core::{CleanerError, Result, Transaction};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{parse_amount, read_rows};

pub const SOURCE: &str = "USAA";
const INTERNAL_TRANSFER: &str = "USAA Transfer";

#[derive(Debug, Deserialize)]
struct UsaaRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Original Description")]
    _original_description: String,
    #[serde(rename = "Category")]
    _category: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Status")]
    _status: String,
}

pub fn parse_usaa_csv(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path).map_err(|e| CleanerError::csv(path, e))?;

    let mut out = Vec::new();
    for (line, row) in read_rows::<_, UsaaRow>(path, &mut rdr)? {
        let amount = -parse_amount(path, line, &row.amount)?;
        if amount <= Decimal::ZERO || row.description == INTERNAL_TRANSFER {
            continue;
        }
        out.push(Transaction::debit(row.date, row.description, amount, SOURCE));
    }

    Ok(out)
}
