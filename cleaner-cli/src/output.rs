use anyhow::{Context, Result};
use chrono::NaiveDate;
use cleaner_core::{Transaction, CANONICAL_HEADER};
use std::fs;
use std::path::{Path, PathBuf};

pub fn default_output_name(today: NaiveDate) -> String {
    format!("transactions-{}.csv", today.format("%Y-%m-%d"))
}

/// Write the table to a hidden sibling first and rename it into place, so a failed run
/// never leaves a half-written file behind.
pub fn write_transactions(path: &Path, txns: &[Transaction]) -> Result<()> {
    let tmp = staging_path(path);

    let result = write_csv(&tmp, txns).and_then(|()| {
        fs::rename(&tmp, path)
            .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_csv(path: &Path, txns: &[Transaction]) -> Result<()> {
    // header written by hand so an empty table still gets one
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.write_record(CANONICAL_HEADER)?;
    for txn in txns {
        wtr.serialize(txn)?;
    }
    wtr.flush().with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transactions.csv".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
