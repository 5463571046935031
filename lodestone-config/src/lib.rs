use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::{fs, io, path::Path};

pub mod limits;
pub mod nbt;

pub use limits::LimitsConfig;
pub use nbt::{NbtBridgeConfig, TreeTagPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Couldn't read configuration file: {0}")]
    Io(#[from] io::Error),
    #[error("Couldn't parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Everything the wire codec can be tuned with.
///
/// The defaults match what a vanilla client and server accept, so an empty
/// (or missing) configuration file is always valid.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CodecConfig {
    pub limits: LimitsConfig,
    pub nbt: NbtBridgeConfig,
}

impl CodecConfig {
    pub const FILE_NAME: &'static str = "codec.toml";

    /// Loads `codec.toml` from `config_dir`. A missing file is not an error;
    /// the defaults are used instead.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(Self::FILE_NAME);
        if !path.exists() {
            warn!(
                "No codec configuration at {:?}, falling back to the defaults",
                &path
            );
            return Ok(Self::default());
        }

        let file_content = fs::read_to_string(&path)?;
        Self::from_toml_str(&file_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> String {
        // Only scalars and enums, serializing cannot fail
        toml::to_string(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.nbt.validate()
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use crate::{CodecConfig, ConfigError, TreeTagPolicy};

    #[test]
    fn test_empty_config_is_default() {
        let config = CodecConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = CodecConfig::from_toml_str(
            r#"
            [limits]
            max_string_length = 255

            [nbt]
            tag_policy = "lenient"
            "#,
        )
        .unwrap();

        assert_eq!(config.limits.max_string_length, 255);
        assert_eq!(
            config.limits.max_array_length,
            CodecConfig::default().limits.max_array_length
        );
        assert_eq!(config.nbt.tag_policy, TreeTagPolicy::Lenient);
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let err = CodecConfig::from_toml_str(
            r#"
            [limits]
            max_string_length = 0
            "#,
        );
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_nbt_depth() {
        assert_eq!(CodecConfig::default().nbt.max_depth, 512);

        let config = CodecConfig::from_toml_str(
            r#"
            [nbt]
            max_depth = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.nbt.max_depth, 64);
        assert_eq!(config.nbt.tag_policy, TreeTagPolicy::Strict);

        let err = CodecConfig::from_toml_str(
            r#"
            [nbt]
            max_depth = 0
            "#,
        );
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodecConfig::load(dir.path()).unwrap();
        assert_eq!(config, CodecConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CodecConfig::default();
        config.limits.max_buffer_length = 1024;
        config.nbt.tag_policy = TreeTagPolicy::Lenient;
        fs::write(
            dir.path().join(CodecConfig::FILE_NAME),
            config.to_toml_string(),
        )
        .unwrap();

        let loaded = CodecConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }
}
