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

//! The GUID -> live asset map.

use crate::error::ResourceError;
use khora_core::asset::{AssetGuid, AssetHandle};
use std::collections::HashMap;

/// Maps each GUID to the live asset imported for it.
///
/// An entry exists exactly while the asset is loaded; the database removes it
/// when the asset is unloaded. Registering a GUID that already belongs to a
/// different asset is an integrity violation and is refused.
#[derive(Debug, Default)]
pub struct GuidRegistry {
    entries: HashMap<AssetGuid, AssetHandle>,
}

impl GuidRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a shared handle to the asset registered under `guid`.
    pub fn lookup(&self, guid: &AssetGuid) -> Option<AssetHandle> {
        self.entries.get(guid).cloned()
    }

    /// Returns `true` if `guid` is registered.
    pub fn contains(&self, guid: &AssetGuid) -> bool {
        self.entries.contains_key(guid)
    }

    /// Registers `asset` under `guid`.
    ///
    /// Re-registering the same asset under its own GUID is a no-op.
    ///
    /// # Errors
    /// [`ResourceError::DuplicateGuid`] if `guid` already maps to a different
    /// asset. The existing entry is left untouched.
    pub fn register(&mut self, guid: AssetGuid, asset: AssetHandle) -> Result<(), ResourceError> {
        if let Some(existing) = self.entries.get(&guid) {
            if existing.ptr_eq(&asset) {
                return Ok(());
            }
            log::error!("Refusing to register GUID {guid}: it already belongs to another asset");
            return Err(ResourceError::DuplicateGuid { guid });
        }
        log::trace!("Registered GUID {guid}");
        self.entries.insert(guid, asset);
        Ok(())
    }

    /// Removes the entry for `guid`, returning its handle. Absent GUIDs are ignored.
    pub fn unregister(&mut self, guid: &AssetGuid) -> Option<AssetHandle> {
        let removed = self.entries.remove(guid);
        if removed.is_some() {
            log::trace!("Unregistered GUID {guid}");
        }
        removed
    }

    /// Drops every entry that nobody outside the registry still holds.
    ///
    /// Returns the GUIDs that were removed, sorted.
    pub fn purge_unreferenced(&mut self) -> Vec<AssetGuid> {
        let mut purged: Vec<AssetGuid> = self
            .entries
            .iter()
            .filter(|(_, handle)| handle.strong_count() == 1)
            .map(|(guid, _)| *guid)
            .collect();
        purged.sort_unstable();
        for guid in &purged {
            self.entries.remove(guid);
        }
        purged
    }

    /// All registered GUIDs, sorted.
    pub fn guids(&self) -> Vec<AssetGuid> {
        let mut guids: Vec<AssetGuid> = self.entries.keys().copied().collect();
        guids.sort_unstable();
        guids
    }

    /// Number of registered assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khora_core::asset::{Asset, AssetType};

    #[derive(Debug, PartialEq)]
    struct TestAsset(u32);

    impl Asset for TestAsset {
        fn asset_type(&self) -> AssetType {
            AssetType::Texture
        }
    }

    #[test]
    fn test_register_then_lookup() {
        let mut registry = GuidRegistry::new();
        let guid = AssetGuid::new();
        let asset = AssetHandle::new(TestAsset(7));

        registry.register(guid, asset.clone()).unwrap();
        let found = registry.lookup(&guid).unwrap();
        assert!(found.ptr_eq(&asset));
        assert_eq!(found.with(|a: &TestAsset| a.0), Some(7));
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut registry = GuidRegistry::new();
        let guid = AssetGuid::new();
        registry.register(guid, AssetHandle::new(TestAsset(1))).unwrap();

        assert!(registry.unregister(&guid).is_some());
        assert!(registry.lookup(&guid).is_none());
        assert!(registry.unregister(&guid).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_guid_keeps_original() {
        let mut registry = GuidRegistry::new();
        let guid = AssetGuid::new();
        let a = AssetHandle::new(TestAsset(1));
        let b = AssetHandle::new(TestAsset(2));

        registry.register(guid, a.clone()).unwrap();
        let err = registry.register(guid, b).unwrap_err();
        assert!(matches!(err, ResourceError::DuplicateGuid { guid: g } if g == guid));
        assert!(registry.lookup(&guid).unwrap().ptr_eq(&a));
    }

    #[test]
    fn test_reregistering_same_asset_is_noop() {
        let mut registry = GuidRegistry::new();
        let guid = AssetGuid::new();
        let a = AssetHandle::new(TestAsset(1));

        registry.register(guid, a.clone()).unwrap();
        registry.register(guid, a.clone()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_purge_unreferenced() {
        let mut registry = GuidRegistry::new();
        let kept_guid = AssetGuid::new();
        let dropped_guid = AssetGuid::new();
        let kept = AssetHandle::new(TestAsset(1));

        registry.register(kept_guid, kept.clone()).unwrap();
        registry
            .register(dropped_guid, AssetHandle::new(TestAsset(2)))
            .unwrap();

        assert_eq!(registry.purge_unreferenced(), vec![dropped_guid]);
        assert_eq!(registry.guids(), vec![kept_guid]);
        drop(kept);
    }
}
