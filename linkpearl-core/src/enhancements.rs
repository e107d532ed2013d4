//! Curated base-to-enhanced item relationships.
//!
//! Upgrade naming on the wiki is inconsistent (crimson/blood, koenig/kaiser,
//! adaman/armada all circulate), so relationships are shipped as reviewed
//! configuration data rather than derived from name patterns. TOML format:
//!
//! ```toml
//! [[enhancements]]
//! base = "zenith_crown"
//! enhanced = "zenith_crown_+1"
//! level = 1
//!
//! [[conversions]]
//! from = "crimson_cuisses"
//! to = "blood_cuisses"
//! ```

use crate::error::{LinkpearlError, Result};
use serde::Deserialize;
use std::path::Path;

/// A base item and one of its levelled upgrades.
#[derive(Debug, Deserialize, Clone)]
pub struct EnhancementEntry {
    pub base: String,
    pub enhanced: String,
    pub level: i32,
}

/// An item that converts into another (e.g. via trade-in).
#[derive(Debug, Deserialize, Clone)]
pub struct ConversionEntry {
    pub from: String,
    pub to: String,
}

/// Complete relationship configuration loaded from TOML.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EnhancementConfig {
    #[serde(default)]
    pub enhancements: Vec<EnhancementEntry>,
    #[serde(default)]
    pub conversions: Vec<ConversionEntry>,
}

impl EnhancementConfig {
    /// Load relationship configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LinkpearlError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read enhancement config from {:?}: {}", path, e),
            ))
        })?;

        Self::from_str(&content)
    }

    /// Parse relationship configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            LinkpearlError::Config(format!("Failed to parse enhancement config TOML: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enhancement_config() {
        let toml = r#"
[[enhancements]]
base = "zenith_crown"
enhanced = "zenith_crown_+1"
level = 1

[[enhancements]]
base = "zenith_mitts"
enhanced = "zenith_mitts_+1"
level = 1

[[conversions]]
from = "crimson_cuisses"
to = "blood_cuisses"
"#;

        let config = EnhancementConfig::from_str(toml).unwrap();
        assert_eq!(config.enhancements.len(), 2);
        assert_eq!(config.enhancements[0].base, "zenith_crown");
        assert_eq!(config.enhancements[0].enhanced, "zenith_crown_+1");
        assert_eq!(config.enhancements[0].level, 1);
        assert_eq!(config.conversions.len(), 1);
        assert_eq!(config.conversions[0].to, "blood_cuisses");
    }

    #[test]
    fn test_sections_default_to_empty() {
        let config = EnhancementConfig::from_str("").unwrap();
        assert!(config.enhancements.is_empty());
        assert!(config.conversions.is_empty());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(EnhancementConfig::from_str("[[enhancements]]\nbase = ").is_err());
    }
}
