use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::{cleaner_home, ensure_cleaner_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub convert: ConvertSection,
    pub output: OutputSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertSection {
    /// Spreadsheet converter binary, looked up on PATH (default: "soffice")
    pub command: String,
    /// Kill the converter after this many seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory for the dated default output file
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Read purchase logs in the old `12.50$` amount layout
    pub legacy_currency_suffix: bool,
}

impl Default for ConvertSection {
    fn default() -> Self {
        Self {
            command: cleaner_ingest::convert::DEFAULT_COMMAND.to_string(),
            timeout_secs: cleaner_ingest::convert::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl ConvertSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(cleaner_home()?.join("config.toml"))
}

/// Load `explicit` if given (it must exist), else the default location if present.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = match explicit {
        Some(p) => {
            if !p.exists() {
                bail!("config file not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = config_path()?;
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn init_config() -> Result<()> {
    let p = ensure_cleaner_home()?.join("config.toml");
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let s = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.convert.command, "soffice");
        assert_eq!(cfg.convert.timeout(), Duration::from_secs(120));
        assert_eq!(cfg.output.dir, PathBuf::from("."));
        assert!(!cfg.log.legacy_currency_suffix);
    }

    #[test]
    fn test_partial_sections() {
        let cfg = parse_config(
            r#"
[convert]
timeout_secs = 30

[log]
legacy_currency_suffix = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.convert.command, "soffice");
        assert_eq!(cfg.convert.timeout_secs, 30);
        assert!(cfg.log.legacy_currency_suffix);
    }

    #[test]
    fn test_defaults_round_trip() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(parse_config(&s).unwrap(), Config::default());
    }

    #[test]
    fn test_bad_types_are_rejected() {
        assert!(parse_config("[convert]\ntimeout_secs = \"soon\"\n").is_err());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let err = load_config(Some(Path::new("/definitely/not/config.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_explicit_path_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("cleaner.toml");
        fs::write(&p, "[output]\ndir = \"/tmp/statements\"\n").unwrap();
        let cfg = load_config(Some(&p)).unwrap();
        assert_eq!(cfg.output.dir, PathBuf::from("/tmp/statements"));
    }
}
