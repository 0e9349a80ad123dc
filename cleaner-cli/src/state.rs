use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$CLEANER_HOME`, or `~/.cleaner`.
pub fn cleaner_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("CLEANER_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cleaner"))
}

pub fn ensure_cleaner_home() -> Result<PathBuf> {
    let dir = cleaner_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
