use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
/// Upper bounds applied while decoding untrusted input
pub struct LimitsConfig {
    /// Maximum byte length of a VarInt prefixed string
    pub max_string_length: usize,
    /// Maximum element count of a length prefixed array
    pub max_array_length: usize,
    /// Maximum byte length of a length prefixed byte buffer
    pub max_buffer_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_string_length: i16::MAX as usize,
            max_array_length: 1_048_576,
            max_buffer_length: 2_097_152,
        }
    }
}

impl LimitsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_string_length == 0 {
            return Err(ConfigError::Invalid(
                "max_string_length must be at least 1".to_string(),
            ));
        }
        if self.max_array_length == 0 {
            return Err(ConfigError::Invalid(
                "max_array_length must be at least 1".to_string(),
            ));
        }
        if self.max_buffer_length == 0 {
            return Err(ConfigError::Invalid(
                "max_buffer_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
