use std::fmt;
use std::str::FromStr;

/// Which statement layout a file is in.
///
/// `Santander` is never produced from a header line: those exports are spreadsheets and
/// are recognized by extension (or forced by the caller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    BofA,
    Usaa,
    Log,
    Santander,
    Unrecognized,
}

impl SourceKind {
    pub fn tag(&self) -> &'static str {
        match self {
            SourceKind::BofA => "bofa",
            SourceKind::Usaa => "usaa",
            SourceKind::Log => "log",
            SourceKind::Santander => "santander",
            SourceKind::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    /// Parses a parser name. `unrecognized` is not something a caller can ask for.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bofa" => Ok(SourceKind::BofA),
            "usaa" => Ok(SourceKind::Usaa),
            "log" => Ok(SourceKind::Log),
            "santander" => Ok(SourceKind::Santander),
            other => Err(format!(
                "unknown statement type '{other}' (expected bofa, usaa, log or santander)"
            )),
        }
    }
}
