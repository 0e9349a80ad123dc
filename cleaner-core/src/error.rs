use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CleanerError>;

/// Every failure is fatal to the run; nothing here is retried.
#[derive(Debug, Error)]
pub enum CleanerError {
    #[error("unrecognized file type: {}", .path.display())]
    UnrecognizedFormat { path: PathBuf },

    #[error("malformed input in {}{}: {reason}", .path.display(), row_suffix(.row))]
    MalformedInput {
        path: PathBuf,
        row: Option<u64>,
        reason: String,
    },

    #[error("{tool} failed: {reason}")]
    ExternalTool { tool: String, reason: String },

    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

fn row_suffix(row: &Option<u64>) -> String {
    match row {
        Some(r) => format!(" (row {r})"),
        None => String::new(),
    }
}

impl CleanerError {
    pub fn malformed(path: impl Into<PathBuf>, row: Option<u64>, reason: impl Into<String>) -> Self {
        CleanerError::MalformedInput {
            path: path.into(),
            row,
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CleanerError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a csv error. Deserialization failures (missing columns, bad types) and rows
    /// with the wrong number of fields are reported as malformed input, everything else
    /// as a csv error.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        let path = path.into();
        let (row, reason) = match source.kind() {
            csv::ErrorKind::Deserialize { pos, err } => {
                (pos.as_ref().map(|p| p.line()), err.to_string())
            }
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => (
                pos.as_ref().map(|p| p.line()),
                format!("expected {expected_len} fields, found {len}"),
            ),
            _ => return CleanerError::Csv { path, source },
        };
        CleanerError::MalformedInput { path, row, reason }
    }

    pub fn external(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        CleanerError::ExternalTool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_file() {
        let err = CleanerError::UnrecognizedFormat {
            path: PathBuf::from("stmt.csv"),
        };
        assert_eq!(err.to_string(), "unrecognized file type: stmt.csv");

        let err = CleanerError::malformed("bofa.csv", Some(3), "Amount is not a number: \"abc\"");
        assert_eq!(
            err.to_string(),
            "malformed input in bofa.csv (row 3): Amount is not a number: \"abc\""
        );

        let err = CleanerError::malformed("log.csv", None, "empty");
        assert_eq!(err.to_string(), "malformed input in log.csv: empty");
    }

    #[test]
    fn test_ragged_row_is_malformed_input() {
        let data = "a,b,c\n1,2,3\n4,5,6,7\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let err = rdr
            .records()
            .find_map(|r| r.err())
            .map(|e| CleanerError::csv("ragged.csv", e))
            .unwrap();
        match err {
            CleanerError::MalformedInput { row, reason, .. } => {
                assert_eq!(row, Some(3));
                assert_eq!(reason, "expected 3 fields, found 4");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
