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

//! Provides the foundational traits and primitive types for Khora's asset system.
//!
//! This module defines the "common language" for all asset-related operations in the
//! engine. It contains the core contracts that other crates will implement or use,
//! but it has no knowledge of how assets are located on disk or imported.
//!
//! The key components are:
//! - The [`Asset`] trait: implemented by every in-memory asset representation.
//! - [`AssetGuid`]: the stable identity of an asset, independent of its path.
//! - [`AssetType`] and [`ExtensionTable`]: classification of files by extension.
//! - [`AssetHandle`]: shared ownership of an imported asset.
//! - [`AssetMetadata`]: the persisted "identity card" written next to each source file.
//!
//! The asset database built on top of these primitives lives in `khora-resources`.

mod asset_type;
mod guid;
mod handle;
mod metadata;

pub use asset_type::*;
pub use guid::*;
pub use handle::*;
pub use metadata::*;

use crate::reflect::Reflect;
use std::any::Any;

/// Type-erasure helper giving trait objects access to [`Any`].
///
/// Implemented for every `'static` type; never implement it by hand.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A trait for the in-memory representation of imported content.
///
/// The supertraits enforce critical safety guarantees:
/// - `Send` + `Sync`: the asset can be shared between the editor, the scene graph
///   and background importers.
/// - `'static`: the asset does not borrow anything, so it can live in the
///   database for as long as it has owners.
///
/// Serialization is opt-in: a type becomes visible to the inspector and the
/// archive codec by implementing [`Reflect`] and returning itself from
/// [`Asset::reflect`]. Types that do not override it are non-serializable.
///
/// # Examples
///
/// ```
/// use khora_core::asset::{Asset, AssetType};
///
/// struct Splash {
///     pixels: Vec<u8>,
/// }
///
/// impl Asset for Splash {
///     fn asset_type(&self) -> AssetType {
///         AssetType::Texture
///     }
/// }
/// ```
pub trait Asset: AsAny + Send + Sync + 'static {
    /// The category this asset belongs to.
    fn asset_type(&self) -> AssetType;

    /// Read access to the asset's fields, if the type is serializable.
    fn reflect(&self) -> Option<&dyn Reflect> {
        None
    }

    /// Write access to the asset's fields, if the type is serializable.
    fn reflect_mut(&mut self) -> Option<&mut dyn Reflect> {
        None
    }
}
