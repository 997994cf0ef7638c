use anyhow::{Context, Result};
use focusplan_core::{SchedulePolicy, Settings, SettingsRow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::state::ensure_focusplan_home;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IANA timezone used to decide what "today" is.
    pub timezone: String,
    pub work_hours: WorkHoursSection,
    pub policy: SchedulePolicy,
    pub log: LogSection,
}

/// Fallback working hours when no settings row is supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkHoursSection {
    pub work_start: String,
    pub work_end: String,
    pub break_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            work_hours: WorkHoursSection::default(),
            policy: SchedulePolicy::default(),
            log: LogSection::default(),
        }
    }
}

impl Default for WorkHoursSection {
    fn default() -> Self {
        Self {
            work_start: "09:00".to_string(),
            work_end: "17:00".to_string(),
            break_minutes: 15,
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "focusplan_core=info,focusplan=info".to_string(),
        }
    }
}

impl WorkHoursSection {
    pub fn settings(&self) -> Settings {
        Settings::from_row(&SettingsRow {
            work_start: Some(self.work_start.clone()),
            work_end: Some(self.work_end.clone()),
            break_length: Some(f64::from(self.break_minutes)),
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_focusplan_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// A missing file means defaults; anything unreadable or malformed is an error.
pub fn load_config_from(path: &Path) -> Result<Config> {
    match fs::read_to_string(path) {
        Ok(s) => parse_config(&s).with_context(|| format!("parse {}", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

/// Write the defaults to `path` unless a file is already there.
///
/// Returns whether anything was written.
pub fn write_default_config(path: &Path) -> Result<bool> {
    let body = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e).with_context(|| format!("create {}", path.display())),
    };
    file.write_all(body.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(true)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if write_default_config(&p)? {
        println!("Wrote {}", p.display());
    } else {
        println!("Config already exists: {}", p.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = parse_config(
            r#"
timezone = "Europe/Berlin"

[work_hours]
work_start = "08:00"

[policy]
chunk_minutes = 60
"#,
        )
        .unwrap();
        assert_eq!(cfg.timezone, "Europe/Berlin");
        let settings = cfg.work_hours.settings();
        assert_eq!(settings.work_start_minutes, 480);
        assert_eq!(settings.work_end_minutes, 1020);
        assert_eq!(settings.break_minutes, 15);
        assert_eq!(cfg.policy.chunk_minutes, 60);
        assert_eq!(cfg.policy.focus_chunk_minutes, 120);
    }

    #[test]
    fn defaults_survive_a_round_trip() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(parse_config(&s).unwrap(), Config::default());
    }

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("focusplan-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = scratch_path("missing.toml");
        assert_eq!(load_config_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn init_writes_once_and_never_overwrites() {
        let path = scratch_path("init.toml");
        assert!(write_default_config(&path).unwrap());
        assert_eq!(load_config_from(&path).unwrap(), Config::default());

        fs::write(&path, "timezone = \"Asia/Tokyo\"\n").unwrap();
        assert!(!write_default_config(&path).unwrap());
        assert_eq!(load_config_from(&path).unwrap().timezone, "Asia/Tokyo");
    }

    #[test]
    fn malformed_file_names_the_path() {
        let path = scratch_path("broken.toml");
        fs::write(&path, "[work_hours\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }
}
