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

//! The path -> importer map.

use crate::{
    directories::normalize_path,
    importer::{SharedImporter, WeakImporter},
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Maps each source path to the importer currently responsible for it.
///
/// Bindings are weak: the index never keeps an importer alive. Once the owner
/// drops an importer, its binding resolves to `None` exactly like a path that
/// was never imported, and callers treat both as "needs (re)import".
#[derive(Debug, Default)]
pub struct PathIndex {
    bindings: HashMap<PathBuf, WeakImporter>,
}

impl PathIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `path` to `importer`, replacing any previous binding.
    pub fn bind(&mut self, path: &Path, importer: &SharedImporter) {
        let key = normalize_path(path);
        log::trace!("Bound '{}' to an importer", key.display());
        self.bindings.insert(key, Arc::downgrade(importer));
    }

    /// Returns the importer bound to `path`, if it is still alive.
    pub fn resolve(&self, path: &Path) -> Option<SharedImporter> {
        self.bindings
            .get(&normalize_path(path))
            .and_then(|weak| weak.upgrade())
    }

    /// Removes the binding for `path`. Returns `true` if one existed.
    pub fn unbind(&mut self, path: &Path) -> bool {
        self.bindings.remove(&normalize_path(path)).is_some()
    }

    /// Drops bindings whose importer no longer exists, returning how many.
    pub fn prune(&mut self) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|_, weak| weak.strong_count() > 0);
        let pruned = before - self.bindings.len();
        if pruned > 0 {
            log::debug!("Pruned {pruned} expired path bindings");
        }
        pruned
    }

    /// Paths whose importer is still alive, sorted.
    pub fn live_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .bindings
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Number of bindings, including expired ones not yet pruned.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::{share_importer, TextureImporter};

    fn importer() -> SharedImporter {
        share_importer(Box::new(TextureImporter::new()))
    }

    #[test]
    fn test_bind_then_resolve() {
        let mut index = PathIndex::new();
        let imp = importer();
        index.bind(Path::new("/assets/hero.png"), &imp);

        let resolved = index.resolve(Path::new("/assets/hero.png")).unwrap();
        assert!(Arc::ptr_eq(&resolved, &imp));
        assert!(index.resolve(Path::new("/assets/villain.png")).is_none());
    }

    #[test]
    fn test_keys_are_normalized() {
        let mut index = PathIndex::new();
        let imp = importer();
        index.bind(Path::new("/assets/./textures/../hero.png"), &imp);

        assert!(index.resolve(Path::new("/assets/hero.png")).is_some());
        assert!(index.unbind(Path::new("/assets/textures/../hero.png")));
        assert!(index.is_empty());
    }

    #[test]
    fn test_destroyed_importer_resolves_to_none() {
        let mut index = PathIndex::new();
        let imp = importer();
        let path = Path::new("/assets/hero.png");
        index.bind(path, &imp);

        drop(imp);
        assert!(index.resolve(path).is_none());
        // The stale entry lingers until pruned.
        assert_eq!(index.len(), 1);
        assert!(index.live_paths().is_empty());
        assert_eq!(index.prune(), 1);
        assert!(index.is_empty());
    }

    #[test]
    fn test_rebind_replaces_and_unbind_is_idempotent() {
        let mut index = PathIndex::new();
        let first = importer();
        let second = importer();
        let path = Path::new("/assets/hero.png");

        index.bind(path, &first);
        index.bind(path, &second);
        assert!(Arc::ptr_eq(&index.resolve(path).unwrap(), &second));

        assert!(index.unbind(path));
        assert!(!index.unbind(path));
        assert!(index.resolve(path).is_none());
    }
}
