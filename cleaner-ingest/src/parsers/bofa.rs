//! Bank of America credit card CSV export.
//!
//! Layout:
//!   Posted Date,Reference Number,Payee,Address,Amount
//!   01/05/2024,24692164005100012345,"PAYMENT - THANK YOU",,-200.00
//!
//! Charges are negative in the export. Amounts are negated and only positive results are
//! kept, which drops payments and refunds.

use std::path::Path;

use cleaner_core::{CleanerError, Result, Transaction};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{parse_amount, read_rows};

pub const SOURCE: &str = "BofA";

#[derive(Debug, Deserialize)]
struct BofaRow {
    #[serde(rename = "Posted Date")]
    posted_date: String,
    #[serde(rename = "Reference Number")]
    _reference_number: String,
    #[serde(rename = "Payee")]
    payee: String,
    #[serde(rename = "Address")]
    _address: String,
    #[serde(rename = "Amount")]
    amount: String,
}

pub fn parse_bofa_csv(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path).map_err(|e| CleanerError::csv(path, e))?;

    let mut out = Vec::new();
    for (line, row) in read_rows::<_, BofaRow>(path, &mut rdr)? {
        let amount = -parse_amount(path, line, &row.amount)?;
        if amount <= Decimal::ZERO {
            continue;
        }
        out.push(Transaction::debit(row.posted_date, row.payee, amount, SOURCE));
    }

    Ok(out)
}
