//! Generation settings loaded from TOML.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::placement::DEFAULT_MAX_DEQUEUES;
use crate::types::ZoneConstraints;

pub const DEFAULT_ZONE_KEY: &str = "dungeon";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    pub zone_key: String,
    pub seed: u64,
    pub constraints: ZoneConstraints,
    /// Livelock cap on the placement walk.
    pub max_dequeues: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            zone_key: DEFAULT_ZONE_KEY.to_string(),
            seed: 0,
            constraints: ZoneConstraints::default(),
            max_dequeues: DEFAULT_MAX_DEQUEUES,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("config is not valid TOML")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl GenerationConfig {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        Self::from_toml(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.constraints;
        if self.zone_key.is_empty() {
            return Err(ConfigError::Invalid("zone_key must not be empty".to_string()));
        }
        for (axis, min, max, span) in [
            ("x", limits.min_x, limits.max_x, limits.max_w),
            ("y", limits.min_y, limits.max_y, limits.max_h),
            ("z", limits.min_z, limits.max_z, limits.max_d),
        ] {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "min_{axis} {min} is above max_{axis} {max}"
                )));
            }
            if span < 1 {
                return Err(ConfigError::Invalid(format!(
                    "{axis} span limit must be at least 1, got {span}"
                )));
            }
        }
        if self.max_dequeues == 0 {
            return Err(ConfigError::Invalid("max_dequeues must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_file_is_the_default_config() {
        let config = GenerationConfig::from_toml("").expect("empty config parses");
        assert_eq!(config, GenerationConfig::default());
        assert_eq!(config.max_dequeues, 1000);
    }

    #[test]
    fn partial_constraints_keep_other_defaults() {
        let config = GenerationConfig::from_toml(
            r#"
            zone_key = "sunken_temple"
            seed = 42

            [constraints]
            max_w = 6
            max_z = 0
            "#,
        )
        .expect("config parses");
        assert_eq!(config.zone_key, "sunken_temple");
        assert_eq!(config.constraints.max_w, 6);
        assert_eq!(config.constraints.max_z, 0);
        assert_eq!(config.constraints.min_x, ZoneConstraints::default().min_x);
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let err = GenerationConfig::from_toml("[constraints]\nmin_z = 3\nmax_z = 1\n")
            .expect_err("min above max");
        assert!(err.to_string().contains("min_z 3 is above max_z 1"), "unexpected message: {err}");
        assert!(matches!(
            GenerationConfig::from_toml("max_dequeues = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(GenerationConfig::from_toml("sead = 1"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "seed = 7").expect("write config");
        let config = GenerationConfig::load(file.path()).expect("load config");
        assert_eq!(config.seed, 7);
        assert!(matches!(
            GenerationConfig::load(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
