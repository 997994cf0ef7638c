use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// `$FOCUSPLAN_HOME`, or `~/.focusplan`.
pub fn focusplan_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FOCUSPLAN_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".focusplan"))
}

pub fn ensure_focusplan_home() -> Result<PathBuf> {
    let dir = focusplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Read a JSON file into any deserializable record type.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

/// Like [`read_json`], but a missing path yields the default.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(p) => read_json(p),
        None => Ok(T::default()),
    }
}

pub fn write_output(path: Option<&Path>, body: &str) -> Result<()> {
    match path {
        Some(p) => fs::write(p, body).with_context(|| format!("write {}", p.display())),
        None => {
            println!("{body}");
            Ok(())
        }
    }
}
