//! Configuration loading.
//!
//! Each setting resolves in priority order:
//! 1. Command-line flag
//! 2. Environment variable
//! 3. TOML config file (`--config`, else `./attendance.toml` if present)
//! 4. Compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ROOT_ENV: &str = "ATTENDANCE_ROOT";
pub const PROFILE_ENV: &str = "ATTENDANCE_PROFILE";
pub const LOG_ENV: &str = "ATTENDANCE_LOG";
pub const DEFAULT_CONFIG_FILE: &str = "attendance.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Application root; reference data is read from `<root>/data`.
    pub root: PathBuf,
    /// SQLite file holding this profile's session and overrides.
    pub profile: PathBuf,
    pub log_level: String,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub profile: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    root: Option<PathBuf>,
    profile: Option<PathBuf>,
    log_level: Option<String>,
}

impl Config {
    pub fn resolve(cli: &ConfigOverrides) -> Result<Self> {
        Self::resolve_with(
            cli,
            |name| std::env::var(name).ok(),
            Path::new(DEFAULT_CONFIG_FILE),
        )
    }

    /// `default_file` is read only when no `--config` was given and it exists.
    pub fn resolve_with(
        cli: &ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
        default_file: &Path,
    ) -> Result<Self> {
        let file = match &cli.config_file {
            Some(path) => load_toml(path)?,
            None if default_file.exists() => load_toml(default_file)?,
            None => TomlConfig::default(),
        };

        let root = cli
            .root
            .clone()
            .or_else(|| env(ROOT_ENV).map(PathBuf::from))
            .or(file.root)
            .unwrap_or_else(|| PathBuf::from("."));
        let profile = cli
            .profile
            .clone()
            .or_else(|| env(PROFILE_ENV).map(PathBuf::from))
            .or(file.profile)
            .unwrap_or_else(default_profile_path);
        let log_level = cli
            .log_level
            .clone()
            .or_else(|| env(LOG_ENV))
            .or(file.log_level)
            .unwrap_or_else(|| "info".to_string());

        Ok(Self {
            root,
            profile,
            log_level,
        })
    }
}

fn load_toml(path: &Path) -> Result<TomlConfig> {
    let raw = fs::read_to_string(path)
        .map_err(|err| Error::Config(format!("cannot read {}: {err}", path.display())))?;
    toml::from_str(&raw).map_err(|err| Error::Config(format!("{}: {err}", path.display())))
}

/// `<platform data dir>/attendance/profile.db`, or `./attendance-profile.db`
/// when the platform has no data directory.
pub fn default_profile_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("attendance").join("profile.db"))
        .unwrap_or_else(|| PathBuf::from("attendance-profile.db"))
}
