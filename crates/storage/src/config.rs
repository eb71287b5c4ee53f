#![forbid(unsafe_code)]

use fp_core::policy::{AutoCheckpointPolicy, RollbackPolicy};
use std::path::PathBuf;

pub const DEFAULT_STORAGE_DIR: &str = ".forkpoint";

pub const ENV_STORAGE_DIR: &str = "FORKPOINT_STORAGE_DIR";
pub const ENV_AUTO_CHECKPOINT: &str = "FORKPOINT_AUTO_CHECKPOINT";
pub const ENV_KEEP_LATEST: &str = "FORKPOINT_KEEP_LATEST";
pub const ENV_PRUNE_AFTER_CAPTURE: &str = "FORKPOINT_PRUNE_AFTER_CAPTURE";
pub const ENV_IGNORED_TAGS: &str = "FORKPOINT_IGNORED_TAGS";
pub const ENV_INHERIT_CHECKPOINTS: &str = "FORKPOINT_INHERIT_CHECKPOINTS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForkpointConfig {
    pub storage_dir: PathBuf,
    pub auto_checkpoint: AutoCheckpointPolicy,
    pub rollback: RollbackPolicy,
}

impl Default for ForkpointConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            auto_checkpoint: AutoCheckpointPolicy::default(),
            rollback: RollbackPolicy::default(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: expected a boolean flag, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
    #[error("{key}: expected a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

impl ForkpointConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for unset or blank keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(dir) = read(ENV_STORAGE_DIR) {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(raw) = read(ENV_AUTO_CHECKPOINT) {
            config.auto_checkpoint.enabled = parse_flag(ENV_AUTO_CHECKPOINT, &raw)?;
        }
        if let Some(raw) = read(ENV_KEEP_LATEST) {
            config.auto_checkpoint.keep_latest =
                raw.parse::<usize>().map_err(|_| ConfigError::InvalidNumber {
                    key: ENV_KEEP_LATEST,
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = read(ENV_PRUNE_AFTER_CAPTURE) {
            config.auto_checkpoint.prune_after_capture =
                parse_flag(ENV_PRUNE_AFTER_CAPTURE, &raw)?;
        }
        if let Some(raw) = read(ENV_IGNORED_TAGS) {
            config.auto_checkpoint.ignored_tags = raw
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(raw) = read(ENV_INHERIT_CHECKPOINTS) {
            config.rollback.inherit_checkpoints = parse_flag(ENV_INHERIT_CHECKPOINTS, &raw)?;
        }

        Ok(config)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = ForkpointConfig::from_lookup(|_| None).expect("defaults");
        assert_eq!(config, ForkpointConfig::default());
        assert!(config.auto_checkpoint.enabled);
        assert_eq!(config.auto_checkpoint.keep_latest, 5);
        assert!(config.rollback.inherit_checkpoints);
    }

    #[test]
    fn overrides_are_applied() {
        let config = ForkpointConfig::from_lookup(lookup_from(&[
            (ENV_STORAGE_DIR, "/tmp/fp"),
            (ENV_AUTO_CHECKPOINT, "off"),
            (ENV_KEEP_LATEST, " 2 "),
            (ENV_PRUNE_AFTER_CAPTURE, "YES"),
            (ENV_IGNORED_TAGS, "noop, ,ping"),
            (ENV_INHERIT_CHECKPOINTS, "0"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.storage_dir, PathBuf::from("/tmp/fp"));
        assert!(!config.auto_checkpoint.enabled);
        assert_eq!(config.auto_checkpoint.keep_latest, 2);
        assert!(config.auto_checkpoint.prune_after_capture);
        assert_eq!(
            config.auto_checkpoint.ignored_tags,
            vec!["noop".to_string(), "ping".to_string()]
        );
        assert!(!config.rollback.inherit_checkpoints);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = ForkpointConfig::from_lookup(lookup_from(&[(ENV_KEEP_LATEST, "-1")]))
            .expect_err("negative retention");
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: ENV_KEEP_LATEST,
                value: "-1".to_string()
            }
        );

        let err = ForkpointConfig::from_lookup(lookup_from(&[(ENV_AUTO_CHECKPOINT, "maybe")]))
            .expect_err("unknown flag");
        assert!(matches!(err, ConfigError::InvalidFlag { key, .. } if key == ENV_AUTO_CHECKPOINT));
    }
}
