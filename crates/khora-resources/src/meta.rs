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

//! `.meta` sidecar persistence.
//!
//! Every imported source file gets a sidecar named after the full file name
//! plus `.meta` (`hero.png` -> `hero.png.meta`), holding its
//! [`AssetMetadata`] as pretty-printed RON.

use crate::error::ImportError;
use khora_core::asset::AssetMetadata;
use ron::ser::PrettyConfig;
use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

/// The extension of sidecar files.
pub const META_EXTENSION: &str = "meta";

/// The sidecar path for `source`.
pub fn meta_path_for(source: &Path) -> PathBuf {
    let mut name = source
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(META_EXTENSION);
    source.with_file_name(name)
}

/// Returns `true` if `path` is a sidecar rather than a source file.
pub fn is_meta_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(META_EXTENSION))
}

/// Reads the sidecar of `source`.
///
/// Returns `Ok(None)` when there is no sidecar yet.
///
/// # Errors
/// [`ImportError::CorruptData`] if the sidecar exists but does not parse, and
/// [`ImportError::Io`] for any other read failure.
pub fn read_meta(source: &Path) -> Result<Option<AssetMetadata>, ImportError> {
    let path = meta_path_for(source);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ImportError::io(path, e)),
    };
    ron::from_str(&text)
        .map(Some)
        .map_err(|e| ImportError::corrupt(path, format!("invalid meta file: {e}")))
}

/// Writes (or overwrites) the sidecar of `source`.
pub fn write_meta(source: &Path, metadata: &AssetMetadata) -> Result<(), ImportError> {
    let path = meta_path_for(source);
    let text = ron::ser::to_string_pretty(metadata, PrettyConfig::default())
        .map_err(|e| ImportError::corrupt(&path, format!("failed to serialize meta: {e}")))?;
    fs::write(&path, text).map_err(|e| ImportError::io(path, e))?;
    Ok(())
}
