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

//! Error types for the resource database.

use khora_core::asset::AssetGuid;
use std::path::PathBuf;
use thiserror::Error;

/// The coarse kind of an [`ImportError`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportErrorKind {
    /// The importer cannot interpret the file.
    UnsupportedFormat,
    /// The file could not be read or written.
    IoFailure,
    /// The file is structurally invalid.
    CorruptData,
}

/// An error produced while importing a single source file.
///
/// All variants are recoverable at the call site: the caller may retry, skip
/// the file, or report it to the user.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The importer cannot interpret the file despite a plausible extension.
    #[error("Unsupported format for '{}': {reason}", .path.display())]
    UnsupportedFormat {
        /// The file being imported.
        path: PathBuf,
        /// Why the importer gave up.
        reason: String,
    },

    /// Reading the source (or writing its `.meta`) failed.
    #[error("I/O failure on '{}': {source}", .path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file was read but its content is invalid.
    #[error("Corrupt data in '{}': {reason}", .path.display())]
    CorruptData {
        /// The file being imported.
        path: PathBuf,
        /// What the decoder rejected.
        reason: String,
    },
}

impl ImportError {
    /// The coarse kind of this error.
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            ImportError::UnsupportedFormat { .. } => ImportErrorKind::UnsupportedFormat,
            ImportError::Io { .. } => ImportErrorKind::IoFailure,
            ImportError::CorruptData { .. } => ImportErrorKind::CorruptData,
        }
    }

    /// The file the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ImportError::UnsupportedFormat { path, .. }
            | ImportError::Io { path, .. }
            | ImportError::CorruptData { path, .. } => path,
        }
    }

    pub(crate) fn unsupported(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ImportError::UnsupportedFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ImportError::CorruptData {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// An error produced by the asset database.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A directory the operation depends on was never configured.
    ///
    /// This is a precondition violation: `init` / `set_assets_directory` must
    /// run before any path resolution or import.
    #[error("{what} is not initialized")]
    NotInitialized {
        /// The missing piece of configuration.
        what: &'static str,
    },

    /// A GUID is already registered to a different live asset.
    #[error("GUID {guid} is already registered to a different asset")]
    DuplicateGuid {
        /// The conflicting identifier.
        guid: AssetGuid,
    },

    /// The path has no live importer, so there is nothing to reimport or move.
    #[error("'{}' has not been imported", .path.display())]
    NotImported {
        /// The requested path.
        path: PathBuf,
    },

    /// The destination path already holds a file or another asset's binding.
    #[error("'{}' is already occupied", .path.display())]
    PathOccupied {
        /// The destination that was refused.
        path: PathBuf,
    },

    /// A reimport was requested from an importer that never completed an import.
    #[error("The importer has no previous import to repeat")]
    NoImportTarget,

    /// Importing a file failed.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// A filesystem operation outside of import failed.
    #[error("I/O failure on '{}': {source}", .path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The filesystem watcher could not be started.
    #[error("Failed to watch the assets directory: {0}")]
    Watch(#[from] notify::Error),
}

impl ResourceError {
    /// The import error kind, if this error came from an importer.
    pub fn import_kind(&self) -> Option<ImportErrorKind> {
        match self {
            ResourceError::Import(e) => Some(e.kind()),
            _ => None,
        }
    }
}
