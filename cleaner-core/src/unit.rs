//! Currency unit tags carried by the legacy purchase-log layout

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Usd,
    Eur,
    Unspecified,
}

impl Unit {
    /// Map a trailing currency character (`$`, `€`) to its unit
    pub fn from_suffix(c: char) -> Self {
        match c {
            '$' => Unit::Usd,
            '€' => Unit::Eur,
            _ => Unit::Unspecified,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Unit::Usd => "USD",
            Unit::Eur => "EUR",
            Unit::Unspecified => "",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
