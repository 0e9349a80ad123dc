//! Statement layout detection.
//!
//! Detection is an exact comparison of the file's first line against the header each
//! vendor exports. There is deliberately no fuzzy matching: a vendor renaming a column
//! makes the file unrecognized and the run stops.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use cleaner_core::{CleanerError, Result};
use tracing::debug;

use crate::types::SourceKind;

pub const USAA_HEADER: &str = "Date,Description,Original Description,Category,Amount,Status";
pub const BOFA_HEADER: &str = "Posted Date,Reference Number,Payee,Address,Amount";
pub const LOG_HEADER: &str = "Date,Amount,Description";

const SIGNATURES: [(&str, SourceKind); 3] = [
    (USAA_HEADER, SourceKind::Usaa),
    (BOFA_HEADER, SourceKind::BofA),
    (LOG_HEADER, SourceKind::Log),
];

/// Longest header line worth reading; every signature is far shorter.
pub const MAX_HEADER_BYTES: u64 = 4096;

/// Extensions handed to the spreadsheet converter instead of being sniffed.
const SPREADSHEET_EXTENSIONS: [&str; 3] = ["xls", "xlsx", "ods"];

/// Map a header line to its layout. Trailing whitespace (including `\r`) is ignored.
pub fn detect(first_line: &str) -> SourceKind {
    let line = first_line.trim_end();
    SIGNATURES
        .iter()
        .find(|(sig, _)| *sig == line)
        .map(|(_, kind)| *kind)
        .unwrap_or(SourceKind::Unrecognized)
}

/// Read only the first line of `path` and detect its layout.
///
/// At most [`MAX_HEADER_BYTES`] are read. A first line that is not UTF-8 (Latin-1 exports,
/// binary spreadsheets with a `.csv` name) is unrecognized, not an error.
pub fn sniff(path: impl AsRef<Path>) -> Result<SourceKind> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| CleanerError::io(path, e))?;
    let mut first = Vec::new();
    BufReader::new(file)
        .take(MAX_HEADER_BYTES)
        .read_until(b'\n', &mut first)
        .map_err(|e| CleanerError::io(path, e))?;

    let kind = match std::str::from_utf8(&first) {
        Ok(line) => detect(line),
        Err(_) => {
            debug!(path = %path.display(), "first line is not utf-8");
            SourceKind::Unrecognized
        }
    };
    debug!(path = %path.display(), %kind, "sniffed header");
    Ok(kind)
}

/// Spreadsheet exports are Santander; everything else is sniffed.
pub fn classify(path: impl AsRef<Path>) -> Result<SourceKind> {
    let path = path.as_ref();
    if is_spreadsheet(path) {
        return Ok(SourceKind::Santander);
    }
    sniff(path)
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}
