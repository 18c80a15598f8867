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

use super::{AssetGuid, AssetType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The family of importer responsible for a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImporterKind {
    /// Image files decoded into textures.
    Texture,
    /// Meshes exported from DCC tools.
    Model,
    /// Text formats the engine reads directly (materials, shaders, scripts).
    NativeFormat,
}

impl ImporterKind {
    /// The importer family that handles a given asset category, if any.
    pub fn for_asset_type(asset_type: AssetType) -> Option<Self> {
        match asset_type {
            AssetType::Texture => Some(ImporterKind::Texture),
            AssetType::Model => Some(ImporterKind::Model),
            AssetType::Shader | AssetType::Material | AssetType::Script => {
                Some(ImporterKind::NativeFormat)
            }
            AssetType::Unknown => None,
        }
    }
}

impl fmt::Display for ImporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImporterKind::Texture => "TextureImporter",
            ImporterKind::Model => "ModelImporter",
            ImporterKind::NativeFormat => "NativeFormatImporter",
        };
        f.write_str(name)
    }
}

/// Per-asset import options, persisted in the asset's `.meta` file.
///
/// Every field has a default so that `.meta` files written by older versions
/// keep loading when new options are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Treat texture data as sRGB-encoded color.
    pub srgb: bool,
    /// Flip textures vertically on import.
    pub flip_vertical: bool,
    /// Generate smooth, area-weighted normals for meshes that have none.
    pub generate_normals: bool,
    /// Uniform scale applied to mesh positions.
    pub scale: f32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            srgb: true,
            flip_vertical: false,
            generate_normals: false,
            scale: 1.0,
        }
    }
}

/// Serializable metadata persisted next to each imported source file.
///
/// This is the asset's "identity card": it carries the GUID minted on first
/// import, so the identity survives renames and moves as long as the `.meta`
/// file travels with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// The unique, stable identifier for this asset.
    pub guid: AssetGuid,

    /// The category of the asset, as classified at import time.
    pub asset_type: AssetType,

    /// The importer family that produced the asset.
    pub importer: ImporterKind,

    /// The settings the importer last ran with.
    #[serde(default)]
    pub settings: ImportSettings,

    /// A collection of semantic labels for organisation and search.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl AssetMetadata {
    /// Creates metadata for a freshly imported asset.
    pub fn new(
        guid: AssetGuid,
        asset_type: AssetType,
        importer: ImporterKind,
        settings: ImportSettings,
    ) -> Self {
        Self {
            guid,
            asset_type,
            importer,
            settings,
            labels: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importer_kind_for_asset_type() {
        assert_eq!(
            ImporterKind::for_asset_type(AssetType::Texture),
            Some(ImporterKind::Texture)
        );
        assert_eq!(
            ImporterKind::for_asset_type(AssetType::Model),
            Some(ImporterKind::Model)
        );
        for ty in [AssetType::Shader, AssetType::Material, AssetType::Script] {
            assert_eq!(
                ImporterKind::for_asset_type(ty),
                Some(ImporterKind::NativeFormat)
            );
        }
        assert_eq!(ImporterKind::for_asset_type(AssetType::Unknown), None);
    }

    #[test]
    fn test_import_settings_defaults() {
        let settings = ImportSettings::default();
        assert!(settings.srgb);
        assert!(!settings.flip_vertical);
        assert!(!settings.generate_normals);
        assert_eq!(settings.scale, 1.0);
    }
}
