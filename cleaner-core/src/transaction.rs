//! Canonical transaction record shared by every statement parser

use rust_decimal::Decimal;
use serde::Serialize;

/// Output column order. Serialization of [`Transaction`] follows this order.
pub const CANONICAL_HEADER: [&str; 5] = ["Date", "Name", "Category", "Amount", "Source"];

/// One normalized charge, bank-agnostic.
///
/// Dates are kept in the vendor's own textual format; nothing downstream parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Name")]
    pub name: String,
    /// Always empty at ingestion; filled in by later categorization.
    #[serde(rename = "Category")]
    pub category: String,
    /// Positive = charge/debit. Parsers never emit anything else.
    #[serde(rename = "Amount")]
    pub amount: Decimal,
    /// Account/vendor tag (BofA, USAA, EUR, BA Checking)
    #[serde(rename = "Source")]
    pub source: String,
}

impl Transaction {
    /// Create a debit record with an empty category
    pub fn debit(
        date: impl Into<String>,
        name: impl Into<String>,
        amount: Decimal,
        source: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            name: name.into(),
            category: String::new(),
            amount,
            source: source.into(),
        }
    }

    /// True when the record satisfies the positive-amount invariant
    pub fn is_charge(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Copy of this record with the name lowercased
    pub fn with_lowercase_name(&self) -> Self {
        Self {
            name: self.name.to_lowercase(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_debit_has_empty_category() {
        let txn = Transaction::debit("2024-01-05", "Coffee", Decimal::from_str("3.50").unwrap(), "BofA");
        assert_eq!(txn.category, "");
        assert!(txn.is_charge());
    }

    #[test]
    fn test_zero_is_not_a_charge() {
        let txn = Transaction::debit("2024-01-05", "Refund", Decimal::ZERO, "USAA");
        assert!(!txn.is_charge());
    }

    #[test]
    fn test_lowercase_name_keeps_other_fields() {
        let txn = Transaction::debit("01/02/2024", "AMAZON Mktp", Decimal::new(1999, 2), "USAA");
        let lowered = txn.with_lowercase_name();
        assert_eq!(lowered.name, "amazon mktp");
        assert_eq!(lowered.date, "01/02/2024");
        assert_eq!(lowered.amount, txn.amount);
        assert_eq!(lowered.source, "USAA");
    }

    #[test]
    fn test_serializes_in_canonical_order() {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(Transaction::debit(
            "2024-02-01",
            "Tienda",
            Decimal::from_str("15.50").unwrap(),
            "EUR",
        ))
        .unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some(CANONICAL_HEADER.join(",").as_str()));
        assert_eq!(lines.next(), Some("2024-02-01,Tienda,,15.50,EUR"));
    }
}
