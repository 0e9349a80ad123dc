//! Spreadsheet-to-CSV conversion.
//!
//! Parsers only see the [`Converter`] capability. The production implementation shells out
//! to LibreOffice (`soffice --headless --convert-to csv`), which writes `<stem>.csv` next to
//! the input. The child is killed if it runs past the configured timeout.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use cleaner_core::{CleanerError, Result};
use tracing::{debug, info};

pub const DEFAULT_COMMAND: &str = "soffice";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// UTF-8 output (charset 76), comma separated (44), double-quoted text (34).
const CSV_FILTER: &str = "csv:Text - txt - csv (StarCalc):44,34,76";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Turns a spreadsheet into a CSV file and returns the CSV's path.
pub trait Converter {
    fn convert(&self, path: &Path) -> Result<PathBuf>;
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Accepts CSV input as-is and refuses everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Converter for Passthrough {
    fn convert(&self, path: &Path) -> Result<PathBuf> {
        if is_csv(path) {
            return Ok(path.to_path_buf());
        }
        Err(CleanerError::external(
            "converter",
            format!("conversion disabled and {} is not a .csv file", path.display()),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct SofficeConverter {
    pub command: String,
    pub timeout: Duration,
}

impl Default for SofficeConverter {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SofficeConverter {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }
}

impl Converter for SofficeConverter {
    fn convert(&self, path: &Path) -> Result<PathBuf> {
        if is_csv(path) {
            return Ok(path.to_path_buf());
        }

        let bin = which::which(&self.command)
            .map_err(|e| CleanerError::external(&self.command, format!("not found on PATH: {e}")))?;

        let outdir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        // a csv left over from an earlier run must not pass for this run's output
        let out = path.with_extension("csv");
        if out.exists() {
            info!(path = %out.display(), "removing stale conversion output");
            std::fs::remove_file(&out).map_err(|e| CleanerError::io(&out, e))?;
        }

        info!(path = %path.display(), tool = %bin.display(), "converting spreadsheet to csv");

        let mut cmd = Command::new(&bin);
        cmd.args(["--headless", "--convert-to", CSV_FILTER, "--outdir"])
            .arg(outdir)
            .arg(path);

        let status = run_with_timeout(&mut cmd, &self.command, self.timeout)?;
        if !status.success() {
            return Err(CleanerError::external(
                &self.command,
                format!("exited with {status} while converting {}", path.display()),
            ));
        }

        if !out.exists() {
            return Err(CleanerError::external(
                &self.command,
                format!("expected {} after conversion, but it was not written", out.display()),
            ));
        }
        Ok(out)
    }
}

/// Spawn `cmd` and wait for it, killing it once `timeout` has elapsed.
pub fn run_with_timeout(cmd: &mut Command, tool: &str, timeout: Duration) -> Result<ExitStatus> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CleanerError::external(tool, format!("spawning: {e}")))?;

    match wait_until(&mut child, Instant::now() + timeout)
        .map_err(|e| CleanerError::external(tool, format!("waiting: {e}")))?
    {
        Some(status) => {
            debug!(tool, %status, "external tool finished");
            Ok(status)
        }
        None => {
            let _ = child.kill();
            let _ = child.wait();
            Err(CleanerError::external(
                tool,
                format!("timed out after {}s", timeout.as_secs_f64()),
            ))
        }
    }
}

fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
