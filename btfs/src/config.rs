//! Shell configuration module.
//!
//! This module loads the interactive shell's configuration from environment
//! variables.
//!
//! # Environment Variables
//!
//! - `BTFS_STATE_FILE`: State file used by `save`, `load` and start-up (default: `Data_set.txt`)
//! - `BTFS_MIN_DEGREE`: Minimum degree of every folder index (default: `6`)
//! - `BTFS_AUTOLOAD`: Load the state file on start-up (default: `true`)
//! - `BTFS_AUTOSAVE`: Save the state file on `exit` (default: `false`)
//!
//! # Invariants
//!
//! - `min_degree` is always at least 2

use std::path::PathBuf;

use crate::index::MinDegree;

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Path of the state file.
    pub state_file: PathBuf,
    /// Minimum degree used for every folder index.
    pub min_degree: MinDegree,
    /// Load the state file on start-up, if it exists.
    pub autoload: bool,
    /// Save the state file when the shell exits.
    pub autosave: bool,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ShellConfig {
    /// Default state file.
    pub const DEFAULT_STATE_FILE: &'static str = "Data_set.txt";
    pub const DEFAULT_AUTOLOAD: bool = true;
    pub const DEFAULT_AUTOSAVE: bool = false;

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `BTFS_MIN_DEGREE` is set but is not an integer of at least 2
    /// - `BTFS_AUTOLOAD` or `BTFS_AUTOSAVE` is set but is not a boolean
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let state_file = lookup("BTFS_STATE_FILE")
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from(Self::DEFAULT_STATE_FILE), PathBuf::from);
        let min_degree = Self::load_min_degree(lookup("BTFS_MIN_DEGREE"))?;
        let autoload = Self::load_flag("BTFS_AUTOLOAD", lookup("BTFS_AUTOLOAD"), Self::DEFAULT_AUTOLOAD)?;
        let autosave = Self::load_flag("BTFS_AUTOSAVE", lookup("BTFS_AUTOSAVE"), Self::DEFAULT_AUTOSAVE)?;

        Ok(Self {
            state_file,
            min_degree,
            autoload,
            autosave,
        })
    }

    fn load_min_degree(value: Option<String>) -> Result<MinDegree, ConfigError> {
        let Some(value) = value else {
            return Ok(MinDegree::DEFAULT);
        };

        let invalid = |message: String| ConfigError::InvalidValue {
            name: "BTFS_MIN_DEGREE".to_string(),
            message,
        };
        let t = value
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid(format!("'{value}' is not a valid integer")))?;
        MinDegree::new(t).map_err(|e| invalid(e.to_string()))
    }

    /// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`.
    fn load_flag(name: &str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = value else {
            return Ok(default);
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: name.to_string(),
                message: format!("'{value}' is not a boolean"),
            }),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(Self::DEFAULT_STATE_FILE),
            min_degree: MinDegree::DEFAULT,
            autoload: Self::DEFAULT_AUTOLOAD,
            autosave: Self::DEFAULT_AUTOSAVE,
        }
    }
}
