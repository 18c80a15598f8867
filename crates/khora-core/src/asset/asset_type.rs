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

//! Coarse asset categories and the extension table used to classify files.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, path::Path, str::FromStr};

/// The coarse category of an asset, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// The extension is not registered, or is malformed.
    Unknown,
    /// Images decoded into textures.
    Texture,
    /// Meshes and scenes exported from a DCC tool.
    Model,
    /// Shader source and shader include files.
    Shader,
    /// Engine-native material descriptions.
    Material,
    /// Gameplay scripts.
    Script,
}

impl AssetType {
    /// Every category, in declaration order.
    pub const ALL: [AssetType; 6] = [
        AssetType::Unknown,
        AssetType::Texture,
        AssetType::Model,
        AssetType::Shader,
        AssetType::Material,
        AssetType::Script,
    ];

    /// The lower-case name used in configuration files and `.meta` files.
    pub fn name(&self) -> &'static str {
        match self {
            AssetType::Unknown => "unknown",
            AssetType::Texture => "texture",
            AssetType::Model => "model",
            AssetType::Shader => "shader",
            AssetType::Material => "material",
            AssetType::Script => "script",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Error returned when parsing an unrecognised asset type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAssetTypeError(pub String);

impl fmt::Display for ParseAssetTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown asset type name '{}'", self.0)
    }
}

impl std::error::Error for ParseAssetTypeError {}

impl FromStr for AssetType {
    type Err = ParseAssetTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetType::ALL
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseAssetTypeError(s.to_string()))
    }
}

/// The built-in extension table.
const DEFAULT_EXTENSIONS: &[(&str, AssetType)] = &[
    ("png", AssetType::Texture),
    ("jpg", AssetType::Texture),
    ("jpeg", AssetType::Texture),
    ("bmp", AssetType::Texture),
    ("tga", AssetType::Texture),
    ("gif", AssetType::Texture),
    ("hdr", AssetType::Texture),
    ("tif", AssetType::Texture),
    ("tiff", AssetType::Texture),
    ("dds", AssetType::Texture),
    ("psd", AssetType::Texture),
    ("webp", AssetType::Texture),
    ("fbx", AssetType::Model),
    ("obj", AssetType::Model),
    ("gltf", AssetType::Model),
    ("glb", AssetType::Model),
    ("dae", AssetType::Model),
    ("blend", AssetType::Model),
    ("3ds", AssetType::Model),
    ("shader", AssetType::Shader),
    ("wgsl", AssetType::Shader),
    ("glsl", AssetType::Shader),
    ("hlsl", AssetType::Shader),
    ("vert", AssetType::Shader),
    ("frag", AssetType::Shader),
    ("comp", AssetType::Shader),
    ("inc", AssetType::Shader),
    ("surf", AssetType::Shader),
    ("mat", AssetType::Material),
    ("material", AssetType::Material),
    ("cs", AssetType::Script),
    ("lua", AssetType::Script),
    ("js", AssetType::Script),
    ("rhai", AssetType::Script),
];

/// Normalises an extension for table lookups.
///
/// A single leading `.` is accepted. Returns `None` for malformed input: empty
/// strings, or strings containing separators, whitespace or further dots.
fn normalize_extension(extension: &str) -> Option<String> {
    let ext = extension.strip_prefix('.').unwrap_or(extension);
    let malformed = ext.is_empty()
        || ext
            .chars()
            .any(|c| c == '.' || c == '/' || c == '\\' || c.is_whitespace());
    if malformed {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Classifies an extension against the built-in table.
///
/// Total and pure: unmapped or malformed extensions return [`AssetType::Unknown`].
/// Matching is case-insensitive and accepts an optional leading dot.
///
/// ```
/// use khora_core::asset::{get_asset_type, AssetType};
///
/// assert_eq!(get_asset_type("PNG"), AssetType::Texture);
/// assert_eq!(get_asset_type(".fbx"), AssetType::Model);
/// assert_eq!(get_asset_type("docx"), AssetType::Unknown);
/// ```
pub fn get_asset_type(extension: &str) -> AssetType {
    let Some(ext) = normalize_extension(extension) else {
        return AssetType::Unknown;
    };
    DEFAULT_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, ty)| *ty)
        .unwrap_or(AssetType::Unknown)
}

/// A mutable, case-insensitive `extension -> AssetType` table.
///
/// The asset database owns one of these so that projects can register extra
/// extensions through configuration instead of recompiling the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    entries: HashMap<String, AssetType>,
}

impl ExtensionTable {
    /// Creates a table with no entries. Everything classifies as `Unknown`.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Creates a table pre-populated with the built-in extensions.
    pub fn with_defaults() -> Self {
        let entries = DEFAULT_EXTENSIONS
            .iter()
            .map(|(ext, ty)| (ext.to_string(), *ty))
            .collect();
        Self { entries }
    }

    /// Maps `extension` to `asset_type`, replacing any previous mapping.
    ///
    /// Returns `false` and leaves the table untouched if the extension is malformed.
    pub fn insert(&mut self, extension: &str, asset_type: AssetType) -> bool {
        match normalize_extension(extension) {
            Some(ext) => {
                self.entries.insert(ext, asset_type);
                true
            }
            None => false,
        }
    }

    /// Removes a mapping, returning the category it had.
    pub fn remove(&mut self, extension: &str) -> Option<AssetType> {
        normalize_extension(extension).and_then(|ext| self.entries.remove(&ext))
    }

    /// Classifies an extension. Unmapped or malformed input returns `Unknown`.
    pub fn classify(&self, extension: &str) -> AssetType {
        normalize_extension(extension)
            .and_then(|ext| self.entries.get(&ext).copied())
            .unwrap_or(AssetType::Unknown)
    }

    /// Classifies a path by its extension.
    pub fn classify_path(&self, path: &Path) -> AssetType {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.classify(ext))
            .unwrap_or(AssetType::Unknown)
    }

    /// All extensions mapped to `asset_type`, sorted.
    pub fn extensions_for(&self, asset_type: AssetType) -> Vec<&str> {
        let mut exts: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, ty)| **ty == asset_type)
            .map(|(ext, _)| ext.as_str())
            .collect();
        exts.sort_unstable();
        exts
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no extension is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_asset_type_is_case_insensitive() {
        assert_eq!(get_asset_type("png"), AssetType::Texture);
        assert_eq!(get_asset_type("PNG"), AssetType::Texture);
        assert_eq!(get_asset_type(".Png"), AssetType::Texture);
        assert_eq!(get_asset_type("FBX"), AssetType::Model);
        assert_eq!(get_asset_type("shader"), AssetType::Shader);
        assert_eq!(get_asset_type("mat"), AssetType::Material);
        assert_eq!(get_asset_type("cs"), AssetType::Script);
    }

    #[test]
    fn test_unmapped_and_malformed_extensions_are_unknown() {
        for ext in ["", ".", "docx", "tar.gz", "p ng", "a/b", "..png", "\\obj"] {
            assert_eq!(get_asset_type(ext), AssetType::Unknown, "extension {ext:?}");
        }
    }

    #[test]
    fn test_get_asset_type_is_deterministic() {
        for (ext, _) in DEFAULT_EXTENSIONS {
            let first = get_asset_type(ext);
            assert_eq!(first, get_asset_type(ext));
            assert_ne!(first, AssetType::Unknown);
        }
    }

    #[test]
    fn test_table_matches_free_function_by_default() {
        let table = ExtensionTable::with_defaults();
        for ext in ["png", "OBJ", ".wgsl", "material", "lua", "zip", ""] {
            assert_eq!(table.classify(ext), get_asset_type(ext));
        }
    }

    #[test]
    fn test_table_insert_and_remove() {
        let mut table = ExtensionTable::with_defaults();
        assert_eq!(table.classify("ktx2"), AssetType::Unknown);

        assert!(table.insert(".KTX2", AssetType::Texture));
        assert_eq!(table.classify("ktx2"), AssetType::Texture);

        assert!(!table.insert("bad ext", AssetType::Texture));
        assert_eq!(table.remove("png"), Some(AssetType::Texture));
        assert_eq!(table.classify("png"), AssetType::Unknown);
    }

    #[test]
    fn test_classify_path_and_extensions_for() {
        let table = ExtensionTable::with_defaults();
        assert_eq!(
            table.classify_path(Path::new("Assets/Models/hero.GLB")),
            AssetType::Model
        );
        assert_eq!(table.classify_path(Path::new("README")), AssetType::Unknown);
        assert_eq!(table.extensions_for(AssetType::Material), vec!["mat", "material"]);
    }

    #[test]
    fn test_asset_type_names_round_trip() {
        for ty in AssetType::ALL {
            assert_eq!(ty.to_string().parse::<AssetType>(), Ok(ty));
        }
        assert!("mesh".parse::<AssetType>().is_err());
    }
}
