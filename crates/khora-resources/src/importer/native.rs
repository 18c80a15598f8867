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

//! Engine-native text formats: materials, shaders and scripts.

use super::{lowercase_extension, read_text, AssetImporter, ImportTarget};
use crate::{
    assets::{Material, Script, ShaderSource},
    error::ImportError,
};
use khora_core::asset::{Asset, AssetType, ImportSettings, ImporterKind};
use std::path::Path;

/// Reads the formats the engine defines itself. No decoding library is
/// involved beyond `ron` for materials; shader and script text is kept verbatim.
#[derive(Debug, Default)]
pub struct NativeFormatImporter {
    target: Option<ImportTarget>,
}

impl NativeFormatImporter {
    /// Creates an importer with no target yet.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetImporter for NativeFormatImporter {
    fn kind(&self) -> ImporterKind {
        ImporterKind::NativeFormat
    }

    fn supports(&self, asset_type: AssetType) -> bool {
        matches!(
            asset_type,
            AssetType::Material | AssetType::Shader | AssetType::Script
        )
    }

    fn import(
        &self,
        path: &Path,
        asset_type: AssetType,
        _settings: &ImportSettings,
    ) -> Result<Box<dyn Asset>, ImportError> {
        let asset: Box<dyn Asset> = match asset_type {
            AssetType::Material => {
                let text = read_text(path)?;
                let mut material: Material = ron::from_str(&text).map_err(|e| {
                    ImportError::corrupt(path, format!("invalid material definition: {e}"))
                })?;
                if material.name.is_empty() {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        material.name = stem.to_string();
                    }
                }
                Box::new(material)
            }
            AssetType::Shader => Box::new(ShaderSource::parse(read_text(path)?)),
            AssetType::Script => Box::new(Script {
                language: lowercase_extension(path),
                source: read_text(path)?,
            }),
            other => {
                return Err(ImportError::unsupported(
                    path,
                    format!("{} cannot produce {other} assets", self.kind()),
                ))
            }
        };
        log::debug!("Read {asset_type} '{}'", path.display());
        Ok(asset)
    }

    fn target(&self) -> Option<&ImportTarget> {
        self.target.as_ref()
    }

    fn set_target(&mut self, target: ImportTarget) {
        self.target = Some(target);
    }
}
