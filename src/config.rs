//! Configuration management for chatvault
//!
//! Loads the process configuration from `config.toml` with environment
//! overrides. The configuration is immutable after load; a reload constructs
//! a fresh manager set from a freshly loaded record and swaps it into the
//! router.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Complete process configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct VaultConfig {
    /// Chat user ids allowed to drive the managers. Supplied externally;
    /// the core only consults membership.
    pub operator_ids: Vec<String>,

    /// One file manager per declared directory root.
    pub managers: Vec<ManagerConfig>,
}

/// Configuration of a single file manager. Immutable after construction;
/// defines the jail boundary for all operations of that manager.
#[derive(Debug, Deserialize, Clone)]
pub struct ManagerConfig {
    /// Command prefix, unique per process (`$<prefix>-list`, ...).
    pub prefix: String,

    /// Directory root the manager is confined to.
    pub root_directory: String,

    /// Human-readable label for the managed items, used in replies.
    pub item_label: String,

    /// Permits subdirectory traversal, mkdir/rmdir and recursive search.
    pub allow_nested_dirs: bool,
}

impl VaultConfig {
    /// Load configuration from `config.toml` with `CHATVAULT_*` environment
    /// overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config"))
            .add_source(Environment::with_prefix("CHATVAULT"))
            .build()?;

        let config: VaultConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.operator_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(config::ConfigError::Message(
                "operator_ids must contain at least one user id".into(),
            ));
        }

        if self.managers.is_empty() {
            return Err(config::ConfigError::Message(
                "at least one [[managers]] entry is required".into(),
            ));
        }

        let mut seen_prefixes = HashSet::new();
        for manager in &self.managers {
            if manager.prefix.is_empty()
                || manager.prefix.contains(char::is_whitespace)
                || manager.prefix.contains('$')
            {
                return Err(config::ConfigError::Message(format!(
                    "invalid manager prefix {:?}",
                    manager.prefix
                )));
            }

            if !seen_prefixes.insert(manager.prefix.clone()) {
                return Err(config::ConfigError::Message(format!(
                    "duplicate manager prefix {:?}",
                    manager.prefix
                )));
            }

            if manager.root_directory.is_empty() {
                return Err(config::ConfigError::Message(format!(
                    "manager {:?} has an empty root_directory",
                    manager.prefix
                )));
            }

            if manager.item_label.is_empty() {
                return Err(config::ConfigError::Message(format!(
                    "manager {:?} has an empty item_label",
                    manager.prefix
                )));
            }
        }

        Ok(())
    }
}

impl ManagerConfig {
    /// Get the root directory as a PathBuf.
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root_directory)
    }
}
