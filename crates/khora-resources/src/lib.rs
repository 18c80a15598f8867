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

//! # Khora Resources
//!
//! The asset database: locates source files on disk, gives each imported
//! asset a stable [`AssetGuid`](khora_core::asset::AssetGuid), classifies
//! files by extension and hands them to importers.
//!
//! [`AssetDatabase`] is the single owner of all of this state. The pieces it
//! is built from ([`DirectoryResolver`], [`GuidRegistry`], [`PathIndex`] and
//! the [`importer`] module) are public so tools can inspect them, but only the
//! database mutates them.

#![warn(missing_docs)]

pub mod assets;
pub mod config;
pub mod database;
pub mod directories;
pub mod error;
pub mod importer;
pub mod meta;
pub mod path_index;
pub mod registry;
pub mod watcher;

pub use config::ResourcesConfig;
pub use database::{AssetDatabase, ImportReport};
pub use directories::DirectoryResolver;
pub use error::{ImportError, ImportErrorKind, ResourceError};
pub use importer::{AssetImporter, ImporterRegistry, SharedImporter};
pub use path_index::PathIndex;
pub use registry::GuidRegistry;
pub use watcher::AssetWatcher;
