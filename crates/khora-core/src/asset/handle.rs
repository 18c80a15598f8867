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

use super::{Asset, AssetType};
use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak},
};

type AssetCell = RwLock<Box<dyn Asset>>;

/// A thread-safe, reference-counted handle to an imported asset.
///
/// This acts as a smart pointer providing shared ownership of an asset's data.
/// Cloning a handle is cheap, as it only increments the reference count and
/// does not duplicate the underlying asset data. The asset is deallocated when
/// the last handle is dropped.
///
/// The content sits behind a lock so that a reimport can swap it in place with
/// [`AssetHandle::replace`]: every holder observes the new content instead of
/// keeping a stale copy.
#[derive(Clone)]
pub struct AssetHandle(Arc<AssetCell>);

impl AssetHandle {
    /// Creates a new `AssetHandle` that takes ownership of the asset data.
    pub fn new<A: Asset>(asset: A) -> Self {
        Self::from_boxed(Box::new(asset))
    }

    /// Creates a new `AssetHandle` from an already type-erased asset.
    pub fn from_boxed(asset: Box<dyn Asset>) -> Self {
        Self(Arc::new(RwLock::new(asset)))
    }

    /// Acquires shared read access to the asset.
    ///
    /// A poisoned lock is recovered: the content is still the last value that
    /// was fully written.
    pub fn read(&self) -> RwLockReadGuard<'_, Box<dyn Asset>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires exclusive write access to the asset.
    pub fn write(&self) -> RwLockWriteGuard<'_, Box<dyn Asset>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swaps the asset content in place and returns the previous content.
    pub fn replace(&self, asset: Box<dyn Asset>) -> Box<dyn Asset> {
        std::mem::replace(&mut *self.write(), asset)
    }

    /// The category of the asset currently held.
    pub fn asset_type(&self) -> AssetType {
        let guard = self.read();
        let asset: &dyn Asset = &**guard;
        asset.asset_type()
    }

    /// Runs `f` against the asset if it is a `T`.
    ///
    /// Returns `None` when the content is of another concrete type.
    pub fn with<T: Asset, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.read();
        let asset: &dyn Asset = &**guard;
        asset.as_any().downcast_ref::<T>().map(f)
    }

    /// Runs `f` against the asset mutably if it is a `T`.
    pub fn with_mut<T: Asset, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.write();
        let asset: &mut dyn Asset = &mut **guard;
        asset.as_any_mut().downcast_mut::<T>().map(f)
    }

    /// Returns `true` if both handles point at the same asset cell.
    pub fn ptr_eq(&self, other: &AssetHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Creates a non-owning reference to this asset.
    pub fn downgrade(&self) -> WeakAssetHandle {
        WeakAssetHandle(Arc::downgrade(&self.0))
    }

    /// Number of live handles to this asset.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("asset_type", &self.asset_type())
            .field("strong_count", &self.strong_count())
            .finish()
    }
}

/// A non-owning reference to an asset. Upgrading after the last
/// [`AssetHandle`] is gone yields `None`.
#[derive(Clone, Default)]
pub struct WeakAssetHandle(Weak<AssetCell>);

impl WeakAssetHandle {
    /// Attempts to obtain a strong handle.
    pub fn upgrade(&self) -> Option<AssetHandle> {
        self.0.upgrade().map(AssetHandle)
    }

    /// Returns `true` once the asset has been dropped.
    pub fn is_expired(&self) -> bool {
        self.0.strong_count() == 0
    }
}

impl fmt::Debug for WeakAssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakAssetHandle")
            .field("expired", &self.is_expired())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestTexture {
        width: u32,
    }

    impl Asset for TestTexture {
        fn asset_type(&self) -> AssetType {
            AssetType::Texture
        }
    }

    #[derive(Debug)]
    struct TestScript;

    impl Asset for TestScript {
        fn asset_type(&self) -> AssetType {
            AssetType::Script
        }
    }

    #[test]
    fn test_typed_access() {
        let handle = AssetHandle::new(TestTexture { width: 64 });
        assert_eq!(handle.asset_type(), AssetType::Texture);
        assert_eq!(handle.with(|t: &TestTexture| t.width), Some(64));
        assert_eq!(handle.with(|_: &TestScript| ()), None);

        handle.with_mut(|t: &mut TestTexture| t.width = 128);
        assert_eq!(handle.with(|t: &TestTexture| t.width), Some(128));
    }

    #[test]
    fn test_replace_is_observed_by_every_clone() {
        let handle = AssetHandle::new(TestTexture { width: 1 });
        let consumer = handle.clone();

        let old = handle.replace(Box::new(TestTexture { width: 2 }));
        let old_asset: &dyn Asset = &*old;
        assert_eq!(
            old_asset.as_any().downcast_ref::<TestTexture>(),
            Some(&TestTexture { width: 1 })
        );
        assert_eq!(consumer.with(|t: &TestTexture| t.width), Some(2));
        assert!(consumer.ptr_eq(&handle));
    }

    #[test]
    fn test_weak_handle_expires() {
        let handle = AssetHandle::new(TestScript);
        let weak = handle.downgrade();
        assert!(weak.upgrade().is_some());
        assert_eq!(handle.strong_count(), 1);

        drop(handle);
        assert!(weak.is_expired());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_distinct_handles_are_not_ptr_eq() {
        let a = AssetHandle::new(TestScript);
        let b = AssetHandle::new(TestScript);
        assert!(!a.ptr_eq(&b));
    }
}
