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

use super::{AssetImporter, ModelImporter, NativeFormatImporter, TextureImporter};
use khora_core::asset::AssetType;
use std::{collections::HashMap, fmt};

/// Builds a fresh importer instance.
pub type ImporterFactory = Box<dyn Fn() -> Box<dyn AssetImporter> + Send + Sync>;

/// Chooses which importer to instantiate for each asset category.
///
/// Every imported path gets its own importer instance, because an importer
/// remembers the target it last ran with.
#[derive(Default)]
pub struct ImporterRegistry {
    factories: HashMap<AssetType, ImporterFactory>,
}

impl ImporterRegistry {
    /// Creates a registry with no factories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in importers for every known category.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(AssetType::Texture, || Box::new(TextureImporter::new()));
        registry.register(AssetType::Model, || Box::new(ModelImporter::new()));
        for ty in [AssetType::Shader, AssetType::Material, AssetType::Script] {
            registry.register(ty, || Box::new(NativeFormatImporter::new()));
        }
        registry
    }

    /// Sets the factory for `asset_type`, replacing any previous one.
    pub fn register<F>(&mut self, asset_type: AssetType, factory: F)
    where
        F: Fn() -> Box<dyn AssetImporter> + Send + Sync + 'static,
    {
        if self
            .factories
            .insert(asset_type, Box::new(factory))
            .is_some()
        {
            log::debug!("Replaced the importer factory for {asset_type} assets");
        }
    }

    /// Creates a new importer for `asset_type`, if one is registered.
    pub fn create(&self, asset_type: AssetType) -> Option<Box<dyn AssetImporter>> {
        self.factories.get(&asset_type).map(|factory| factory())
    }

    /// Returns `true` if `asset_type` has a factory.
    pub fn supports(&self, asset_type: AssetType) -> bool {
        self.factories.contains_key(&asset_type)
    }
}

impl fmt::Debug for ImporterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.factories.keys().collect();
        types.sort_by_key(|ty| ty.name());
        f.debug_struct("ImporterRegistry")
            .field("types", &types)
            .finish()
    }
}
