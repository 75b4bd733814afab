//! Runtime configuration.
//!
//! Everything has a default matching the file-routing convention, so most
//! applications use `RuntimeConfig::default()`. A JSON file can override any
//! subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where route modules live and how their paths are spelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Directory prefix for every module path (no trailing slash).
    pub root: String,
    /// Module file extension, without the dot.
    pub extension: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            root: "/src/routes".to_string(),
            extension: "rs".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub routes: RoutesConfig,
    /// `id` of the element a layout renders its inner content into.
    pub slot_id: String,
    /// Path of the error page that failed navigations redirect to.
    pub error_route: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            routes: RoutesConfig::default(),
            slot_id: "slot".to_string(),
            error_route: "/errors".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
