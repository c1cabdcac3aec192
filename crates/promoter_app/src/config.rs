//! `promoter.ron` settings, overridable from the command line.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::LevelFilter;
use promoter_core::ledger_filename;
use promoter_engine::{CommandSettings, Host, PoolSettings};
use serde::{Deserialize, Serialize};

use crate::logging::LogDestination;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "promoter.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    pub program: PathBuf,
    /// Passed before the host and URL.
    pub args: Vec<String>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        let settings = CommandSettings::default();
        Self {
            program: settings.program,
            args: settings.args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromoterConfig {
    pub hosts: Vec<String>,
    pub command: CommandConfig,
    pub ledger_dir: PathBuf,
    pub ledger_prefix: String,
    pub log_level: String,
    pub log_destination: LogDestination,
    pub join_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub slow_call_secs: u64,
}

impl Default for PromoterConfig {
    fn default() -> Self {
        let pool = PoolSettings::default();
        Self {
            hosts: Vec::new(),
            command: CommandConfig::default(),
            ledger_dir: PathBuf::from("."),
            ledger_prefix: "promotions_".to_string(),
            log_level: "info".to_string(),
            log_destination: LogDestination::default(),
            join_timeout_ms: pool.join_timeout.as_millis() as u64,
            poll_interval_ms: pool.poll_interval.as_millis() as u64,
            slow_call_secs: pool.slow_call.as_secs(),
        }
    }
}

impl PromoterConfig {
    /// Read `path`, or `./promoter.ron` if present, or fall back to defaults.
    /// An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_ron(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .with_context(|| format!("unknown log level '{}'", self.log_level))
    }

    pub fn hosts(&self) -> Vec<Host> {
        self.hosts.iter().map(|name| Host::new(name.as_str())).collect()
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            join_timeout: Duration::from_millis(self.join_timeout_ms),
            slow_call: Duration::from_secs(self.slow_call_secs),
        }
    }

    pub fn command_settings(&self) -> CommandSettings {
        CommandSettings {
            program: self.command.program.clone(),
            args: self.command.args.clone(),
            ..CommandSettings::default()
        }
    }

    /// Ledger file for a batch label inside `ledger_dir`.
    pub fn ledger_path(&self, label: &str) -> PathBuf {
        self.ledger_dir
            .join(ledger_filename(&self.ledger_prefix, label))
    }
}
