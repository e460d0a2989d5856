//! Engine configuration, read from `SUITE_DRAW_*` environment variables.

use crate::policy::{Policy, SizeSort};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Request buffer of the store actor's channel.
    pub buffer_size: usize,
    /// Fixed lottery seed. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    pub policy: Policy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64,
            rng_seed: None,
            policy: Policy::default(),
        }
    }
}

impl EngineConfig {
    /// Reads the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup("SUITE_DRAW_BUFFER") {
            config.buffer_size = parse("SUITE_DRAW_BUFFER", &value)?;
            if config.buffer_size == 0 {
                return Err(ConfigError::Invalid {
                    var: "SUITE_DRAW_BUFFER",
                    value,
                    reason: "must be at least 1".into(),
                });
            }
        }
        if let Some(value) = lookup("SUITE_DRAW_SEED") {
            config.rng_seed = Some(parse("SUITE_DRAW_SEED", &value)?);
        }
        if let Some(value) = lookup("SUITE_DRAW_SIZE_SORT") {
            config.policy.size_sort = value
                .parse::<SizeSort>()
                .map_err(|reason| ConfigError::Invalid {
                    var: "SUITE_DRAW_SIZE_SORT",
                    value: value.clone(),
                    reason,
                })?;
        }
        if let Some(value) = lookup("SUITE_DRAW_ADVANTAGE_CLIPS") {
            config.policy.advantage_clips = flag("SUITE_DRAW_ADVANTAGE_CLIPS", &value)?;
        }
        if let Some(value) = lookup("SUITE_DRAW_RESTRICT_CLIP_SIZE") {
            config.policy.restrict_clipping_size = flag("SUITE_DRAW_RESTRICT_CLIP_SIZE", &value)?;
        }
        if let Some(value) = lookup("SUITE_DRAW_ALLOW_CLIPPING") {
            config.policy.allow_clipping = flag("SUITE_DRAW_ALLOW_CLIPPING", &value)?;
        }
        Ok(config)
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "expected a boolean".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_reads_every_variable() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("SUITE_DRAW_BUFFER", "8"),
            ("SUITE_DRAW_SEED", "42"),
            ("SUITE_DRAW_SIZE_SORT", "descending"),
            ("SUITE_DRAW_ADVANTAGE_CLIPS", "true"),
            ("SUITE_DRAW_RESTRICT_CLIP_SIZE", "off"),
            ("SUITE_DRAW_ALLOW_CLIPPING", "0"),
        ]))
        .unwrap();

        assert_eq!(config.buffer_size, 8);
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.policy.size_sort, SizeSort::Descending);
        assert!(config.policy.advantage_clips);
        assert!(!config.policy.restrict_clipping_size);
        assert!(!config.policy.allow_clipping);
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        let err = EngineConfig::from_lookup(lookup(&[("SUITE_DRAW_SEED", "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SUITE_DRAW_SEED", .. }));

        let err =
            EngineConfig::from_lookup(lookup(&[("SUITE_DRAW_SIZE_SORT", "sideways")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SUITE_DRAW_SIZE_SORT", .. }));

        let err = EngineConfig::from_lookup(lookup(&[("SUITE_DRAW_BUFFER", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SUITE_DRAW_BUFFER", .. }));
    }
}
