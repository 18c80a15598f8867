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

//! Filesystem change notifications for hot-reload.

use crate::{directories::normalize_path, meta::is_meta_file};
use crossbeam_channel::{Receiver, TryRecvError};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

/// Watches a directory tree and collects the source files that changed.
///
/// Events are delivered on the OS watcher thread and queued on a channel; the
/// owner drains them on its own schedule with [`AssetWatcher::drain`], so no
/// database state is ever touched from the watcher thread.
pub struct AssetWatcher {
    root: PathBuf,
    events: Receiver<notify::Result<Event>>,
    // Dropping the watcher stops the OS subscription.
    _watcher: RecommendedWatcher,
}

impl AssetWatcher {
    /// Starts watching `root` recursively.
    pub fn new(root: &Path) -> notify::Result<Self> {
        let (sender, events) = crossbeam_channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            // The receiver is gone only while the watcher is being torn down.
            let _ = sender.send(event);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        log::info!("Watching '{}' for asset changes", root.display());

        Ok(Self {
            root: root.to_path_buf(),
            events,
            _watcher: watcher,
        })
    }

    /// The watched directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Takes every change observed since the last call.
    ///
    /// Returns the created, modified or removed source paths, normalised and
    /// deduplicated. Sidecar `.meta` files and access-only events are ignored.
    pub fn drain(&self) -> Vec<PathBuf> {
        let mut changed = BTreeSet::new();
        loop {
            match self.events.try_recv() {
                Ok(Ok(event)) => {
                    if !matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        continue;
                    }
                    changed.extend(
                        event
                            .paths
                            .iter()
                            .filter(|path| !is_meta_file(path))
                            .map(|path| normalize_path(path)),
                    );
                }
                Ok(Err(e)) => log::warn!("Asset watcher error: {e}"),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed.into_iter().collect()
    }
}

impl std::fmt::Debug for AssetWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetWatcher")
            .field("root", &self.root)
            .field("queued", &self.events.len())
            .finish()
    }
}
