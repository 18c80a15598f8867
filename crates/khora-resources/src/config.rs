// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the structure for the `Resources.toml` configuration file.

use anyhow::{Context, Result};
use khora_core::asset::{AssetType, ExtensionTable};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path, path::PathBuf};

/// The default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "Resources.toml";

/// Represents the structure of the `Resources.toml` file.
///
/// ```toml
/// system_root = "."
/// assets_root = "Assets"
/// write_meta_files = true
///
/// [extensions]
/// ktx2 = "texture"
/// fx = "shader"
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ResourcesConfig {
    /// The system root. `None` discovers it from the executable location.
    pub system_root: Option<PathBuf>,
    /// The assets root. `None` leaves it unset until configured explicitly.
    pub assets_root: Option<PathBuf>,
    /// Write a `.meta` sidecar next to every imported file.
    pub write_meta_files: bool,
    /// Extension overrides merged over the built-in table.
    pub extensions: BTreeMap<String, AssetType>,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            system_root: None,
            assets_root: None,
            write_meta_files: true,
            extensions: BTreeMap::new(),
        }
    }
}

impl ResourcesConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse resources configuration")
    }

    /// Loads the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{}'", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))
    }

    /// Loads the configuration at `path`, falling back to defaults if the file
    /// does not exist. A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            log::info!("Loading resources configuration from '{}'", path.display());
            Self::load(path)
        } else {
            log::info!(
                "No '{}' found. Using default configuration.",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// The built-in extension table with this configuration's overrides applied.
    ///
    /// Malformed extensions are skipped with a warning.
    pub fn extension_table(&self) -> ExtensionTable {
        let mut table = ExtensionTable::with_defaults();
        for (extension, asset_type) in &self.extensions {
            if !table.insert(extension, *asset_type) {
                log::warn!("Ignoring malformed extension '{extension}' in configuration");
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResourcesConfig::from_toml("").unwrap();
        assert_eq!(config, ResourcesConfig::default());
        assert!(config.write_meta_files);
        assert_eq!(config.extension_table(), ExtensionTable::with_defaults());
    }

    #[test]
    fn test_full_config() {
        let config = ResourcesConfig::from_toml(
            r#"
            system_root = "/opt/khora"
            assets_root = "/projects/demo/Assets"
            write_meta_files = false

            [extensions]
            ktx2 = "texture"
            ".PNG" = "unknown"
            "#,
        )
        .unwrap();

        assert_eq!(config.system_root, Some(PathBuf::from("/opt/khora")));
        assert!(!config.write_meta_files);

        let table = config.extension_table();
        assert_eq!(table.classify("ktx2"), AssetType::Texture);
        assert_eq!(table.classify("png"), AssetType::Unknown);
        assert_eq!(table.classify("obj"), AssetType::Model);
    }

    #[test]
    fn test_invalid_type_name_is_rejected() {
        assert!(ResourcesConfig::from_toml("[extensions]\nktx2 = \"picture\"").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResourcesConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, ResourcesConfig::default());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "write_meta_files = \"yes\"").unwrap();

        let err = ResourcesConfig::load_or_default(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }
}
