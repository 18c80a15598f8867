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

//! The importer contract and the built-in importers.
//!
//! An importer turns the file at a path into an in-memory [`Asset`]. Each
//! importer instance serves one path at a time and remembers the
//! [`ImportTarget`] it last ran with, which is what makes a reimport possible
//! without the caller repeating the path and settings.
//!
//! Importers only decode. Registering the result in the GUID registry and
//! binding the path is the database's job, so that a failed import can never
//! leave partial state behind.

mod model;
mod native;
mod registry;
mod texture;

pub use model::ModelImporter;
pub use native::NativeFormatImporter;
pub use registry::{ImporterFactory, ImporterRegistry};
pub use texture::TextureImporter;

use crate::error::ImportError;
use khora_core::asset::{Asset, AssetGuid, AssetType, ImportSettings, ImporterKind};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, Weak},
};

/// The path, identity and settings an importer last ran with.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportTarget {
    /// The absolute, normalised source path.
    pub path: PathBuf,
    /// The GUID of the produced asset.
    pub guid: AssetGuid,
    /// The settings used.
    pub settings: ImportSettings,
}

/// A trait for the units that turn a source file into an in-memory asset.
///
/// This represents the "data plane" of importing: implementors are responsible
/// for the potentially CPU-intensive work of reading, parsing and decoding a
/// file into an engine-ready asset.
pub trait AssetImporter: Send {
    /// The importer family, recorded in `.meta` files.
    fn kind(&self) -> ImporterKind;

    /// Returns `true` if this importer produces assets of `asset_type`.
    fn supports(&self, asset_type: AssetType) -> bool;

    /// Reads the file at `path` and decodes it into an asset of `asset_type`.
    ///
    /// # Errors
    /// - [`ImportError::UnsupportedFormat`] if the content cannot be interpreted
    ///   despite a plausible extension.
    /// - [`ImportError::Io`] if the file cannot be read.
    /// - [`ImportError::CorruptData`] if the content is structurally invalid.
    fn import(
        &self,
        path: &Path,
        asset_type: AssetType,
        settings: &ImportSettings,
    ) -> Result<Box<dyn Asset>, ImportError>;

    /// The target of the last successful import, if any.
    fn target(&self) -> Option<&ImportTarget>;

    /// Records the target of a successful import.
    fn set_target(&mut self, target: ImportTarget);
}

/// An importer with shared ownership, as held by the database.
pub type SharedImporter = Arc<Mutex<Box<dyn AssetImporter>>>;

/// A non-owning reference to a [`SharedImporter`], as held by the path index.
pub type WeakImporter = Weak<Mutex<Box<dyn AssetImporter>>>;

/// Wraps a boxed importer for shared ownership.
pub fn share_importer(importer: Box<dyn AssetImporter>) -> SharedImporter {
    Arc::new(Mutex::new(importer))
}

/// Reads a whole file, mapping failures to [`ImportError::Io`].
pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, ImportError> {
    fs::read(path).map_err(|source| ImportError::io(path, source))
}

/// Reads a whole file as UTF-8 text. Invalid UTF-8 is corrupt data.
pub(crate) fn read_text(path: &Path) -> Result<String, ImportError> {
    let bytes = read_bytes(path)?;
    String::from_utf8(bytes)
        .map_err(|e| ImportError::corrupt(path, format!("file is not valid UTF-8: {e}")))
}

/// The lower-cased extension of `path`, or an empty string.
pub(crate) fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}
