use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct NbtBridgeConfig {
    pub tag_policy: TreeTagPolicy,
    /// How many compounds and lists may nest, the root compound included
    pub max_depth: usize,
}

impl Default for NbtBridgeConfig {
    fn default() -> Self {
        Self {
            tag_policy: TreeTagPolicy::default(),
            max_depth: 512,
        }
    }
}

impl NbtBridgeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// What to do when an optional NBT field starts with a tag that is neither
/// `End` nor `Compound`.
#[derive(Deserialize, Serialize, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TreeTagPolicy {
    /// Fail the decode, leaving the cursor in front of the tag
    #[default]
    Strict,
    /// Treat the value as absent and leave the tag byte unread
    Lenient,
}
