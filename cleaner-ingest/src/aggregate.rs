//! Run the right parser over every input and merge the results into one table.

use std::collections::BTreeSet;
use std::path::Path;

use cleaner_core::{CleanerError, Result, Transaction};
use tracing::{debug, info, warn};

use crate::convert::Converter;
use crate::detect::classify;
use crate::parsers::bofa::parse_bofa_csv;
use crate::parsers::purchase_log::{parse_purchase_log_entries, LogLayout};
use crate::parsers::santander::parse_santander;
use crate::parsers::usaa::parse_usaa_csv;
use crate::types::SourceKind;

pub struct Aggregator<'a> {
    converter: &'a dyn Converter,
    log_layout: LogLayout,
    forced: Option<SourceKind>,
}

impl<'a> Aggregator<'a> {
    pub fn new(converter: &'a dyn Converter) -> Self {
        Self {
            converter,
            log_layout: LogLayout::default(),
            forced: None,
        }
    }

    pub fn log_layout(mut self, layout: LogLayout) -> Self {
        self.log_layout = layout;
        self
    }

    /// Skip detection and treat every input as `kind`.
    pub fn force_kind(mut self, kind: SourceKind) -> Self {
        self.forced = Some(kind);
        self
    }

    /// Parse a single file with whichever parser its layout calls for.
    pub fn parse_one(&self, path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
        let path = path.as_ref();
        let kind = match self.forced {
            Some(kind) => kind,
            None => classify(path)?,
        };

        let txns = match kind {
            SourceKind::BofA => parse_bofa_csv(path)?,
            SourceKind::Usaa => parse_usaa_csv(path)?,
            SourceKind::Santander => parse_santander(path, self.converter)?,
            SourceKind::Log => {
                let entries = parse_purchase_log_entries(path, self.log_layout)?;
                entries
                    .into_iter()
                    .map(|entry| {
                        if let Some(unit) = entry.unit {
                            debug!(date = %entry.transaction.date, %unit, "legacy log unit");
                        }
                        entry.transaction
                    })
                    .collect()
            }
            SourceKind::Unrecognized => {
                return Err(CleanerError::UnrecognizedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        info!(path = %path.display(), %kind, rows = txns.len(), "parsed statement");
        Ok(txns)
    }

    /// Parse every path, then sort by date (lexically) and lowercase names.
    ///
    /// Any failure aborts the whole run; there is no partial result.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Transaction>> {
        let mut all = Vec::new();
        for path in paths {
            all.extend(self.parse_one(path)?);
        }

        warn_on_mixed_date_shapes(&all);

        // stable: equal dates keep input order
        all.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(all.iter().map(Transaction::with_lowercase_name).collect())
    }
}

/// `01/05/2024` -> `99/99/9999`
pub fn date_shape(date: &str) -> String {
    date.chars()
        .map(|c| if c.is_ascii_digit() { '9' } else { c })
        .collect()
}

// Dates are compared as strings, which only orders correctly when every source
// writes them the same way.
fn warn_on_mixed_date_shapes(txns: &[Transaction]) {
    let shapes: BTreeSet<String> = txns.iter().map(|t| date_shape(&t.date)).collect();
    if shapes.len() > 1 {
        warn!(
            shapes = ?shapes,
            "inputs use more than one date format; output is sorted as text and may be out of order"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Passthrough;
    use std::io::Write;

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_merges_sorts_and_lowercases() {
        let bofa = write_csv(
            "Posted Date,Reference Number,Payee,Address,Amount\n\
             2024-01-10,555,WHOLE FOODS,,-50.00\n",
        );
        let usaa = write_csv(
            "Date,Description,Original Description,Category,Amount,Status\n\
             2024-01-02,Netflix,NETFLIX.COM,Entertainment,-30.00,Posted\n",
        );

        let out = Aggregator::new(&Passthrough)
            .run(&[bofa.path(), usaa.path()])
            .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date, "2024-01-02");
        assert_eq!(out[0].name, "netflix");
        assert_eq!(out[0].amount.to_string(), "30.00");
        assert_eq!(out[0].source, "USAA");
        assert_eq!(out[1].date, "2024-01-10");
        assert_eq!(out[1].name, "whole foods");
        assert_eq!(out[1].amount.to_string(), "50.00");
        assert_eq!(out[1].source, "BofA");
    }

    #[test]
    fn test_unrecognized_file_aborts_run() {
        let bofa = write_csv(
            "Posted Date,Reference Number,Payee,Address,Amount\n\
             2024-01-10,555,WHOLE FOODS,,-50.00\n",
        );
        let canonical = write_csv("Date,Name,Category,Amount,Source\n2024-01-10,x,,1.00,BofA\n");

        let err = Aggregator::new(&Passthrough)
            .run(&[bofa.path(), canonical.path()])
            .unwrap_err();
        match err {
            CleanerError::UnrecognizedFormat { path } => assert_eq!(path, canonical.path()),
            other => panic!("expected UnrecognizedFormat, got {other}"),
        }
    }

    #[test]
    fn test_forced_kind_skips_detection() {
        let log = write_csv("Date, Amount, Description, Source\n-2024-03-01,4.00,Cafe,cash\n");

        assert!(Aggregator::new(&Passthrough).parse_one(log.path()).is_err());

        let out = Aggregator::new(&Passthrough)
            .force_kind(SourceKind::Log)
            .run(&[log.path()])
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, "2024-03-01");
        assert_eq!(out[0].source, "BA Checking");
    }

    #[test]
    fn test_legacy_log_layout() {
        let log = write_csv("Date,Amount,Description\n-2024-03-01,4.00€,Cafe\n");

        assert!(Aggregator::new(&Passthrough).run(&[log.path()]).is_err());

        let out = Aggregator::new(&Passthrough)
            .log_layout(LogLayout::LegacyCurrencySuffix)
            .run(&[log.path()])
            .unwrap();
        assert_eq!(out[0].amount.to_string(), "4.00");
    }

    #[test]
    fn test_equal_dates_keep_input_order() {
        let usaa = write_csv(
            "Date,Description,Original Description,Category,Amount,Status\n\
             2024-01-02,B,B,x,-1.00,Posted\n\
             2024-01-02,A,A,x,-2.00,Posted\n",
        );
        let out = Aggregator::new(&Passthrough).run(&[usaa.path()]).unwrap();
        let names: Vec<_> = out.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_date_shape() {
        assert_eq!(date_shape("01/05/2024"), "99/99/9999");
        assert_eq!(date_shape("2024-01-05"), "9999-99-99");
    }

    #[test]
    fn test_no_inputs_gives_empty_table() {
        let paths: [&Path; 0] = [];
        assert!(Aggregator::new(&Passthrough).run(&paths).unwrap().is_empty());
    }
}
