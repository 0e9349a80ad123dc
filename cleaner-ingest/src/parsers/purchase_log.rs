//! Personal purchase log kept by hand.
//!
//! Current layout (column names may be padded, extra `Source` column ignored):
//!   Date, Amount, Description, Source
//!   -2024-03-01, 12.50, Coffee beans, checking
//!
//! A leading `-` on the date is a debit marker, not a sign, and is stripped. Amounts are
//! stored positive already. Every row is attributed to the checking account regardless of
//! what the file says.
//!
//! The older layout appended the currency to the amount (`12.50$`, `9.99€`). That is
//! still readable with [`LogLayout::LegacyCurrencySuffix`]; the unit is reported on the
//! returned [`LoggedPurchase`] but never makes it into the canonical record.

use std::path::Path;
use std::str::FromStr;

use cleaner_core::{CleanerError, Result, Transaction, Unit};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{parse_amount, read_rows};

pub const SOURCE: &str = "BA Checking";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLayout {
    /// Plain positive amounts, no currency.
    #[default]
    Current,
    /// Amounts carry an optional trailing currency character.
    LegacyCurrencySuffix,
}

/// A parsed log row. `unit` is only set for the legacy layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedPurchase {
    pub transaction: Transaction,
    pub unit: Option<Unit>,
}

#[derive(Debug, Deserialize)]
struct LogRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Description")]
    description: String,
}

/// Parse the log into canonical transactions.
pub fn parse_purchase_log(path: impl AsRef<Path>, layout: LogLayout) -> Result<Vec<Transaction>> {
    Ok(parse_purchase_log_entries(path, layout)?
        .into_iter()
        .map(|p| p.transaction)
        .collect())
}

/// Parse the log keeping the per-row currency unit (legacy layout).
pub fn parse_purchase_log_entries(
    path: impl AsRef<Path>,
    layout: LogLayout,
) -> Result<Vec<LoggedPurchase>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| CleanerError::csv(path, e))?;

    let mut out = Vec::new();
    for (line, row) in read_rows::<_, LogRow>(path, &mut rdr)? {
        let (amount, unit) = match layout {
            LogLayout::Current => (parse_amount(path, line, &row.amount)?, None),
            LogLayout::LegacyCurrencySuffix => {
                let (amount, unit) = split_currency_suffix(path, line, &row.amount)?;
                (amount, Some(unit))
            }
        };

        if amount <= Decimal::ZERO {
            return Err(CleanerError::malformed(
                path,
                Some(line),
                format!("log amounts are stored positive, found {amount}"),
            ));
        }

        out.push(LoggedPurchase {
            transaction: Transaction::debit(
                strip_debit_marker(&row.date),
                row.description.trim(),
                amount,
                SOURCE,
            ),
            unit,
        });
    }

    Ok(out)
}

/// Drop one leading `-` (debit marker), then surrounding whitespace.
pub fn strip_debit_marker(date: &str) -> &str {
    date.strip_prefix('-').unwrap_or(date).trim()
}

fn split_currency_suffix(path: &Path, line: u64, raw: &str) -> Result<(Decimal, Unit)> {
    let trimmed = raw.trim();
    let (number, unit) = match trimmed.chars().last() {
        Some(c) if !c.is_ascii_digit() && c != '.' => (
            trimmed[..trimmed.len() - c.len_utf8()].trim_end(),
            Unit::from_suffix(c),
        ),
        _ => (trimmed, Unit::Unspecified),
    };

    let amount = Decimal::from_str(number).map_err(|_| {
        CleanerError::malformed(path, Some(line), format!("Amount is not a number: {raw:?}"))
    })?;
    Ok((amount, unit))
}
