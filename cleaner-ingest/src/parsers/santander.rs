//! Santander (ES) account movements export.
//!
//! The bank only offers a spreadsheet; it goes through a [`Converter`] first. The CSV
//! that comes out has exactly 7 lines of bank boilerplate (account holder, IBAN, date
//! range, ...) before the column header:
//!
//!   FECHA OPERACIÓN,FECHA VALOR,CONCEPTO,IMPORTE EUR,SALDO
//!   01/02/2024,01/02/2024,Tienda,-15.50,1234.56
//!
//! The preamble length is a format contract, not something to guess at. If the row after
//! the 7 skipped lines is not the expected header, the file is rejected.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use cleaner_core::{CleanerError, Result, Transaction};
use rust_decimal::Decimal;
use tracing::debug;

use crate::convert::Converter;

pub const SOURCE: &str = "EUR";
pub const PREAMBLE_LINES: usize = 7;

const DATE_COLUMN: &str = "FECHA OPERACIÓN";
const NAME_COLUMN: &str = "CONCEPTO";
const AMOUNT_COLUMN: &str = "IMPORTE EUR";

/// Convert `path` to CSV if needed, then parse it.
pub fn parse_santander(path: impl AsRef<Path>, converter: &dyn Converter) -> Result<Vec<Transaction>> {
    let csv_path = converter.convert(path.as_ref())?;
    debug!(from = %path.as_ref().display(), to = %csv_path.display(), "converted santander export");
    parse_santander_csv(csv_path)
}

/// Parse an already-converted Santander CSV.
pub fn parse_santander_csv(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| CleanerError::io(path, e))?;
    let mut reader = BufReader::new(file);
    skip_preamble(path, &mut reader)?;

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| CleanerError::csv(path, e))?.clone();
    let date_idx = column(path, &headers, DATE_COLUMN)?;
    let name_idx = column(path, &headers, NAME_COLUMN)?;
    let amount_idx = column(path, &headers, AMOUNT_COLUMN)?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| CleanerError::csv(path, e))?;
        // trailing spreadsheet rows come out as ",,,,"
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0) + PREAMBLE_LINES as u64;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let amount = -parse_importe(path, line, cell(amount_idx))?;
        if amount <= Decimal::ZERO {
            continue;
        }
        out.push(Transaction::debit(cell(date_idx), cell(name_idx), amount, SOURCE));
    }

    Ok(out)
}

fn skip_preamble(path: &Path, reader: &mut impl BufRead) -> Result<()> {
    let mut buf = String::new();
    for n in 0..PREAMBLE_LINES {
        buf.clear();
        let read = reader
            .read_line(&mut buf)
            .map_err(|e| CleanerError::io(path, e))?;
        if read == 0 {
            return Err(CleanerError::malformed(
                path,
                None,
                format!("file ends after {n} lines, inside the {PREAMBLE_LINES}-line preamble"),
            ));
        }
    }
    Ok(())
}

fn column(path: &Path, headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        CleanerError::malformed(
            path,
            Some(PREAMBLE_LINES as u64 + 1),
            format!(
                "expected column {name:?} in the header after the {PREAMBLE_LINES}-line preamble, found {:?}",
                headers.iter().collect::<Vec<_>>()
            ),
        )
    })
}

/// Amounts come as `-15.50` or in Spanish notation `-1.234,56`. Anything else (notably
/// the en-US `-1,020.00`) is rejected rather than guessed at.
fn parse_importe(path: &Path, line: u64, raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);

    let normalized = if is_plain_decimal(unsigned) {
        trimmed.to_string()
    } else if is_spanish_decimal(unsigned) {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        return Err(importe_error(path, line, raw));
    };

    Decimal::from_str(&normalized).map_err(|_| importe_error(path, line, raw))
}

fn importe_error(path: &Path, line: u64, raw: &str) -> CleanerError {
    CleanerError::malformed(path, Some(line), format!("IMPORTE EUR is not a number: {raw:?}"))
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `15` or `15.50`
fn is_plain_decimal(s: &str) -> bool {
    match s.split_once('.') {
        Some((int, frac)) => all_digits(int) && all_digits(frac),
        None => all_digits(s),
    }
}

/// `15,50` or `1.234,56`: thousands groups of three, comma decimal part required.
fn is_spanish_decimal(s: &str) -> bool {
    let Some((int, frac)) = s.split_once(',') else {
        return false;
    };
    if !all_digits(frac) {
        return false;
    }
    let mut groups = int.split('.');
    let head_ok = groups
        .next()
        .map(|g| all_digits(g) && g.len() <= 3)
        .unwrap_or(false);
    head_ok && groups.all(|g| g.len() == 3 && all_digits(g))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Passthrough;
    use std::cell::RefCell;
    use std::io::Write;
    use std::path::PathBuf;

    const PREAMBLE: &str = "Banco Santander\n\
                            Consulta de movimientos\n\
                            Titular: ANA GARCIA\n\
                            Cuenta: ES00 0049 0000 0000 0000 0000\n\
                            Desde: 01/01/2024\n\
                            Hasta: 29/02/2024\n\
                            \n";

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_skips_preamble_and_negates() {
        let f = write_csv(&format!(
            "{PREAMBLE}FECHA OPERACIÓN,CONCEPTO,IMPORTE EUR\n2024-02-01,Tienda,-15.50\n"
        ));

        let txns = parse_santander_csv(f.path()).unwrap();
        assert_eq!(
            txns,
            vec![Transaction::debit(
                "2024-02-01",
                "Tienda",
                Decimal::from_str("15.50").unwrap(),
                "EUR"
            )]
        );
    }

    #[test]
    fn test_drops_deposits_and_blank_rows() {
        let f = write_csv(&format!(
            "{PREAMBLE}FECHA OPERACIÓN,FECHA VALOR,CONCEPTO,IMPORTE EUR,SALDO\n\
             01/02/2024,01/02/2024,Nomina,\"1.500,00\",\"2.000,00\"\n\
             03/02/2024,03/02/2024,Mercadona,\"-1.234,56\",\"765,44\"\n\
             ,,,,\n"
        ));

        let txns = parse_santander_csv(f.path()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].name, "Mercadona");
        assert_eq!(txns[0].amount.to_string(), "1234.56");
    }

    #[test]
    fn test_short_preamble_fails_loudly() {
        let six_lines: String = PREAMBLE.lines().take(6).map(|l| format!("{l}\n")).collect();
        let f = write_csv(&format!(
            "{six_lines}FECHA OPERACIÓN,CONCEPTO,IMPORTE EUR\n2024-02-01,Tienda,-15.50\n"
        ));

        let err = parse_santander_csv(f.path()).unwrap_err();
        assert!(matches!(err, CleanerError::MalformedInput { .. }), "{err}");
    }

    #[test]
    fn test_long_preamble_fails_loudly() {
        let f = write_csv(&format!(
            "{PREAMBLE}extra line\nFECHA OPERACIÓN,CONCEPTO,IMPORTE EUR\n2024-02-01,Tienda,-15.50\n"
        ));
        assert!(matches!(
            parse_santander_csv(f.path()).unwrap_err(),
            CleanerError::MalformedInput { .. }
        ));
    }

    #[test]
    fn test_truncated_file() {
        let f = write_csv("Banco Santander\nConsulta de movimientos\n");
        let err = parse_santander_csv(f.path()).unwrap_err();
        assert!(err.to_string().contains("preamble"));
    }

    #[test]
    fn test_importe_shapes() {
        let p = Path::new("santander.csv");
        assert_eq!(parse_importe(p, 9, "-15.50").unwrap().to_string(), "-15.50");
        assert_eq!(parse_importe(p, 9, "-15,50").unwrap().to_string(), "-15.50");
        assert_eq!(parse_importe(p, 9, "-1.234,56").unwrap().to_string(), "-1234.56");
        assert_eq!(parse_importe(p, 9, "12.345.678,9").unwrap().to_string(), "12345678.9");
        assert_eq!(parse_importe(p, 9, "300").unwrap().to_string(), "300");
        // comma is always the decimal separator here
        assert_eq!(parse_importe(p, 9, "1,020").unwrap().to_string(), "1.020");

        for bad in ["-1,020.00", "1.23.4", "1.2345,00", "1234.567,00", "-", "", "1,", ",5", "1 020,00"] {
            assert!(
                matches!(parse_importe(p, 9, bad), Err(CleanerError::MalformedInput { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_en_us_grouping_fails_loudly() {
        let f = write_csv(&format!(
            "{PREAMBLE}FECHA OPERACIÓN,CONCEPTO,IMPORTE EUR\n2024-02-01,Renfe,\"-1,020.00\"\n"
        ));
        let err = parse_santander_csv(f.path()).unwrap_err();
        assert!(matches!(err, CleanerError::MalformedInput { row: Some(9), .. }), "{err}");
    }

    #[test]
    fn test_bad_amount_reports_file_line() {
        let f = write_csv(&format!(
            "{PREAMBLE}FECHA OPERACIÓN,CONCEPTO,IMPORTE EUR\n2024-02-01,Tienda,quince\n"
        ));
        let err = parse_santander_csv(f.path()).unwrap_err();
        assert!(matches!(err, CleanerError::MalformedInput { row: Some(9), .. }), "{err}");
    }

    struct RecordingConverter {
        target: PathBuf,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl Converter for RecordingConverter {
        fn convert(&self, path: &Path) -> Result<PathBuf> {
            self.calls.borrow_mut().push(path.to_path_buf());
            Ok(self.target.clone())
        }
    }

    #[test]
    fn test_spreadsheet_goes_through_converter() {
        let f = write_csv(&format!(
            "{PREAMBLE}FECHA OPERACIÓN,CONCEPTO,IMPORTE EUR\n2024-02-01,Tienda,-15.50\n"
        ));
        let conv = RecordingConverter {
            target: f.path().to_path_buf(),
            calls: RefCell::new(Vec::new()),
        };

        let txns = parse_santander("movimientos.xlsx", &conv).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(*conv.calls.borrow(), vec![PathBuf::from("movimientos.xlsx")]);
    }

    #[test]
    fn test_converter_failure_propagates() {
        let err = parse_santander("movimientos.xlsx", &Passthrough).unwrap_err();
        assert!(matches!(err, CleanerError::ExternalTool { .. }));
    }
}
