// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Ziano project configuration.
//!
//! Configuration is loaded from `ziano.toml` at the project root.
//!
//! # Example Configuration
//!
//! ```toml
//! [compiler]
//! boolean_attributes = ["selected", "checked", "disabled", "readonly"]
//!
//! [build]
//! source_dir = "templates"
//! output_dir = "compiled"
//! extension = "html"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;
use ziano::CompilerOptions;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "ziano.toml";

/// Main configuration structure loaded from `ziano.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Code generation settings.
    #[serde(default)]
    pub compiler: CompilerOptions,
    /// Project build settings.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Project build configuration.
#[derive(Debug, Deserialize)]
pub struct BuildConfig {
    /// Directory scanned for templates (default: "templates").
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    /// Directory receiving the generated PHP (default: "compiled").
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Template file extension without the dot (default: "html").
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_source_dir() -> String {
    "templates".to_string()
}

fn default_output_dir() -> String {
    "compiled".to_string()
}

fn default_extension() -> String {
    "html".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            extension: default_extension(),
        }
    }
}

impl Config {
    /// Loads configuration from `ziano.toml` in the current directory.
    ///
    /// If no configuration file exists, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be parsed.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads configuration from an explicit path, falling back to defaults
    /// when the file does not exist.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            tracing::debug!("No {} found, using defaults", config_path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let config = Config::load_from(Path::new("does/not/exist/ziano.toml")).unwrap();
        assert_eq!(config.build.source_dir, "templates");
        assert_eq!(config.build.output_dir, "compiled");
        assert_eq!(config.build.extension, "html");
        assert!(config.compiler.is_boolean_attribute("checked"));
    }

    #[test]
    fn test_partial_tables() {
        let config: Config = toml::from_str(
            r#"
[compiler]
boolean_attributes = ["hidden"]

[build]
output_dir = "out"
"#,
        )
        .unwrap();
        assert!(config.compiler.is_boolean_attribute("hidden"));
        assert!(!config.compiler.is_boolean_attribute("checked"));
        assert_eq!(config.build.source_dir, "templates");
        assert_eq!(config.build.output_dir, "out");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[build\nsource_dir = 1").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
