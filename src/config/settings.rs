//! TOML-based configuration for condition compilation.
//!
//! Example configuration:
//! ```toml
//! [joins]
//! default_kind = "inner"   # or "outer"
//! implicit = true          # join association paths referenced only in conditions
//! max_depth = 8
//!
//! [aliases]
//! separator = "_"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dsl::JoinKind;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Join resolution configuration.
    pub joins: JoinSettings,

    /// Alias naming configuration.
    pub aliases: AliasSettings,
}

/// Join resolution configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct JoinSettings {
    /// Join kind for association hops that don't request one explicitly.
    pub default_kind: JoinKind,

    /// Join association paths that are only referenced inside conditions.
    ///
    /// When disabled, referencing an association that was never joined fails
    /// alias resolution instead.
    pub implicit: bool,

    /// Longest association path (in hops) the resolver accepts.
    pub max_depth: usize,
}

impl Default for JoinSettings {
    fn default() -> Self {
        Self {
            default_kind: JoinKind::Inner,
            implicit: true,
            max_depth: 8,
        }
    }
}

/// Alias naming configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AliasSettings {
    /// Separator between the parts of a generated alias (`posts_authors`).
    pub separator: String,
}

impl Default for AliasSettings {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Check value ranges serde can't express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.aliases.separator.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "aliases.separator must not be empty".into(),
            ));
        }
        if self.joins.max_depth == 0 {
            return Err(SettingsError::InvalidConfig(
                "joins.max_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
