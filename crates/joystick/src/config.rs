use std::path::Path;

use ahash::AHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::family::DeviceFamily;
use crate::threshold::{PressureThresholds, ThresholdTable};

const DEFAULT_KEY: &str = "default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("unknown device family \"{0}\"")]
    UnknownFamily(String),
    #[error("falling threshold {falling} must be positive and below rising threshold {rising}")]
    InvalidThresholds { rising: u16, falling: u16 },
    #[error("path error: {0}")]
    PathError(#[from] std::io::Error),
}

/// Engine tuning shared by every device of a context.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub thresholds: ThresholdTable,
}

impl EngineConfig {
    /// Parse a yaml configuration.
    ///
    /// ```yaml
    /// version: 1
    /// thresholds:
    ///   default: { rising: 30000, falling: 15000 }
    ///   wheel: { rising: 20000, falling: 8000 }
    /// ```
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let version = parse_version(input)?;
        match version {
            1 => {
                let raw: ConfigV1 = serde_yaml::from_str(input)?;
                raw.into_config()
            }
            _ => Err(ConfigError::UnsupportedVersion(version)),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::parse(&input)
    }

    pub fn thresholds_for(&self, family: DeviceFamily) -> PressureThresholds {
        self.thresholds.get(family)
    }
}

/// A config with a version.
#[derive(Debug, Clone, Deserialize)]
struct VersionedConfig {
    version: u8,
}

/// Parse the version of yaml config.
fn parse_version(input: &str) -> Result<u8, ConfigError> {
    let raw: VersionedConfig = serde_yaml::from_str(input)?;
    Ok(raw.version)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigV1 {
    #[allow(dead_code)]
    version: u8,
    #[serde(default)]
    thresholds: AHashMap<String, ThresholdsV1>, // family | default -> thresholds
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdsV1 {
    rising: u16,
    falling: u16,
}

impl ConfigV1 {
    fn into_config(self) -> Result<EngineConfig, ConfigError> {
        let mut thresholds = ThresholdTable::default();
        for (name, raw) in self.thresholds {
            let parsed = PressureThresholds::new(raw.rising, raw.falling)?;
            if name == DEFAULT_KEY {
                thresholds.set_default(parsed);
                continue;
            }
            let family = DeviceFamily::from_name(&name)
                .ok_or(ConfigError::UnknownFamily(name))?;
            thresholds.set(family, parsed);
        }
        Ok(EngineConfig { thresholds })
    }
}
