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

//! The asset database: the single context that owns every resource registry.

use crate::{
    config::ResourcesConfig,
    directories::{normalize_path, DirectoryResolver},
    error::{ImportError, ResourceError},
    importer::{share_importer, AssetImporter, ImportTarget, ImporterRegistry, SharedImporter},
    meta::{self, is_meta_file, meta_path_for},
    path_index::PathIndex,
    registry::GuidRegistry,
    watcher::AssetWatcher,
};
use khora_core::{
    asset::{
        AssetGuid, AssetHandle, AssetMetadata, AssetType, ExtensionTable, ImportSettings,
    },
    event::Action,
};
use std::{
    collections::{BTreeSet, HashMap},
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Arc, MutexGuard, PoisonError},
};
use walkdir::WalkDir;

/// The outcome of [`AssetDatabase::refresh`].
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Files imported by this pass, with their GUIDs.
    pub imported: Vec<(PathBuf, AssetGuid)>,
    /// Files whose import failed.
    pub failed: Vec<(PathBuf, ResourceError)>,
    /// Files skipped because their extension is not classified.
    pub skipped: Vec<PathBuf>,
    /// Files that were already imported and left alone.
    pub unchanged: usize,
}

/// Owns the directory resolver, the GUID registry, the path index and the
/// importers, and keeps them consistent with each other.
///
/// Every mutation goes through this type, so a failed import or reimport can
/// never leave a GUID registered without a bound path (or the reverse).
///
/// The database owns each importer it creates. The path index only holds weak
/// references, so a binding never outlives its importer.
///
/// # Examples
///
/// ```no_run
/// use khora_resources::{AssetDatabase, ResourcesConfig};
/// use khora_core::asset::ImportSettings;
///
/// # fn main() -> Result<(), khora_resources::ResourceError> {
/// let mut db = AssetDatabase::new(ResourcesConfig::default());
/// db.init("")?;
/// db.set_assets_directory("Assets")?;
///
/// let guid = db.import("Textures/hero.png", ImportSettings::default())?;
/// assert!(db.lookup(&guid).is_some());
/// # Ok(())
/// # }
/// ```
pub struct AssetDatabase {
    config: ResourcesConfig,
    resolver: DirectoryResolver,
    registry: GuidRegistry,
    path_index: PathIndex,
    importers: ImporterRegistry,
    extensions: ExtensionTable,
    owned: HashMap<AssetGuid, SharedImporter>,
    pending: BTreeSet<PathBuf>,
    watcher: Option<AssetWatcher>,
    asset_changed: Action,
    reimport_requested: Action,
}

fn lock(importer: &SharedImporter) -> MutexGuard<'_, Box<dyn AssetImporter>> {
    importer.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AssetDatabase {
    /// Creates a database with the built-in importers. No directory is set.
    pub fn new(config: ResourcesConfig) -> Self {
        let extensions = config.extension_table();
        Self {
            config,
            resolver: DirectoryResolver::new(),
            registry: GuidRegistry::new(),
            path_index: PathIndex::new(),
            importers: ImporterRegistry::with_defaults(),
            extensions,
            owned: HashMap::new(),
            pending: BTreeSet::new(),
            watcher: None,
            asset_changed: Action::new(),
            reimport_requested: Action::new(),
        }
    }

    /// Creates a database and applies the directories named in `config`.
    ///
    /// The system root is always initialised (discovered when not configured);
    /// the assets directory only when configured.
    pub fn open(config: ResourcesConfig) -> Result<Self, ResourceError> {
        let system_root = config.system_root.clone().unwrap_or_default();
        let assets_root = config.assets_root.clone();

        let mut db = Self::new(config);
        db.init(system_root)?;
        if let Some(assets_root) = assets_root {
            db.set_assets_directory(assets_root)?;
        }
        Ok(db)
    }

    /// The configuration this database was created with.
    pub fn config(&self) -> &ResourcesConfig {
        &self.config
    }

    /// The directory resolver.
    pub fn directories(&self) -> &DirectoryResolver {
        &self.resolver
    }

    /// The GUID registry (read-only; mutate through the database).
    pub fn registry(&self) -> &GuidRegistry {
        &self.registry
    }

    /// The path index (read-only; mutate through the database).
    pub fn path_index(&self) -> &PathIndex {
        &self.path_index
    }

    /// The importer factories. Replacing a factory only affects later imports.
    pub fn importers_mut(&mut self) -> &mut ImporterRegistry {
        &mut self.importers
    }

    /// The extension table used for classification.
    pub fn extensions(&self) -> &ExtensionTable {
        &self.extensions
    }

    /// Mutable access to the extension table.
    pub fn extensions_mut(&mut self) -> &mut ExtensionTable {
        &mut self.extensions
    }

    // --- Directories ---

    /// Sets the system root. An empty path discovers it.
    pub fn init(&mut self, root: impl AsRef<Path>) -> Result<&Path, ResourceError> {
        self.resolver.init(root)
    }

    /// Sets the project assets root.
    pub fn set_assets_directory(&mut self, path: impl AsRef<Path>) -> Result<(), ResourceError> {
        self.resolver.set_assets_directory(path)
    }

    /// The project assets root.
    pub fn assets_directory(&self) -> Result<&Path, ResourceError> {
        self.resolver.assets_directory()
    }

    /// `<system root>/Engine/Shaders`.
    pub fn shader_root_directory(&self) -> Result<PathBuf, ResourceError> {
        self.resolver.shader_root_directory()
    }

    /// `<system root>/Engine/Shaders/include`.
    pub fn shader_header_directory(&self) -> Result<PathBuf, ResourceError> {
        self.resolver.shader_header_directory()
    }

    /// `<system root>/Assets/Textures`.
    pub fn texture_root_directory(&self) -> Result<PathBuf, ResourceError> {
        self.resolver.texture_root_directory()
    }

    /// `<system root>/Assets/Models`.
    pub fn model_root_directory(&self) -> Result<PathBuf, ResourceError> {
        self.resolver.model_root_directory()
    }

    /// `<system root>/Assets/Fonts`.
    pub fn font_root_directory(&self) -> Result<PathBuf, ResourceError> {
        self.resolver.font_root_directory()
    }

    /// `<system root>/Example`.
    pub fn example_root_directory(&self) -> Result<PathBuf, ResourceError> {
        self.resolver.example_root_directory()
    }

    /// Searches the assets tree for `filename`.
    pub fn find_asset_file(&self, filename: &str) -> Result<Option<PathBuf>, ResourceError> {
        self.resolver.find_asset_file(filename)
    }

    /// Searches the system tree for `filename`.
    pub fn find_system_file(&self, filename: &str) -> Result<Option<PathBuf>, ResourceError> {
        self.resolver.find_system_file(filename)
    }

    /// Classifies `path` with this database's extension table.
    pub fn asset_type(&self, path: impl AsRef<Path>) -> AssetType {
        self.extensions.classify_path(path.as_ref())
    }

    /// Turns a caller path into the key used by the index: relative paths are
    /// taken relative to the assets root, then normalised.
    fn source_path(&self, path: &Path) -> Result<PathBuf, ResourceError> {
        if path.is_absolute() {
            Ok(normalize_path(path))
        } else {
            Ok(normalize_path(&self.assets_directory()?.join(path)))
        }
    }

    // --- Import ---

    /// Imports the file at `path` with `settings` and returns its GUID.
    ///
    /// A GUID stored in the file's `.meta` sidecar is reused; otherwise a new
    /// one is minted. If the path already has a live importer, this is a
    /// reimport with the new settings and the GUID is unchanged.
    ///
    /// # Errors
    /// - [`ResourceError::NotInitialized`] for a relative path with no assets root.
    /// - [`ResourceError::Import`] if no importer handles the file type or the
    ///   importer fails.
    /// - [`ResourceError::DuplicateGuid`] if the sidecar GUID is already used
    ///   by another live asset.
    ///
    /// On error, the registry and the index are left exactly as they were.
    pub fn import(
        &mut self,
        path: impl AsRef<Path>,
        settings: ImportSettings,
    ) -> Result<AssetGuid, ResourceError> {
        let path = self.source_path(path.as_ref())?;
        if let Some(importer) = self.path_index.resolve(&path) {
            log::debug!(
                "'{}' is already imported, reimporting with new settings",
                path.display()
            );
            return self.reimport_with(&importer, Some(settings));
        }

        let asset_type = self.extensions.classify_path(&path);
        let mut importer = self.importers.create(asset_type).ok_or_else(|| {
            ImportError::unsupported(&path, format!("no importer is registered for {asset_type} files"))
        })?;

        let stored = meta::read_meta(&path)?;
        let guid = stored.as_ref().map(|m| m.guid).unwrap_or_else(AssetGuid::new);

        let asset = importer.import(&path, asset_type, &settings)?;
        self.registry
            .register(guid, AssetHandle::from_boxed(asset))?;

        if self.config.write_meta_files {
            let mut metadata = stored.unwrap_or_else(|| {
                AssetMetadata::new(guid, asset_type, importer.kind(), settings.clone())
            });
            metadata.asset_type = asset_type;
            metadata.importer = importer.kind();
            metadata.settings = settings.clone();
            if let Err(e) = meta::write_meta(&path, &metadata) {
                self.registry.unregister(&guid);
                return Err(e.into());
            }
        }

        importer.set_target(ImportTarget {
            path: path.clone(),
            guid,
            settings,
        });
        let importer = share_importer(importer);
        self.path_index.bind(&path, &importer);
        self.owned.insert(guid, importer);

        log::info!("Imported '{}' as {asset_type} {guid}", path.display());
        self.notify_asset_changed();
        Ok(guid)
    }

    /// Imports `path` with the settings stored in its `.meta`, or the defaults.
    pub fn import_with_stored_settings(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<AssetGuid, ResourceError> {
        let path = self.source_path(path.as_ref())?;
        let settings = meta::read_meta(&path)?
            .map(|m| m.settings)
            .unwrap_or_default();
        self.import(&path, settings)
    }

    /// Re-runs the importer bound to `path` with its last settings.
    ///
    /// The asset's content is swapped in place: every [`AssetHandle`] already
    /// handed out sees the new data, and the GUID does not change.
    ///
    /// # Errors
    /// [`ResourceError::NotImported`] if the path has no live importer. Import
    /// failures leave the previous content in place.
    pub fn reimport(&mut self, path: impl AsRef<Path>) -> Result<AssetGuid, ResourceError> {
        let path = self.source_path(path.as_ref())?;
        let importer = self
            .path_index
            .resolve(&path)
            .ok_or(ResourceError::NotImported { path })?;
        self.reimport_with(&importer, None)
    }

    /// Re-runs `importer` with its last target.
    ///
    /// If the asset had been unloaded, it is registered again under the same
    /// GUID and the database takes ownership of the importer once more.
    pub fn reimport_importer(
        &mut self,
        importer: &SharedImporter,
    ) -> Result<AssetGuid, ResourceError> {
        self.reimport_with(importer, None)
    }

    fn reimport_with(
        &mut self,
        importer: &SharedImporter,
        settings: Option<ImportSettings>,
    ) -> Result<AssetGuid, ResourceError> {
        let mut guard = lock(importer);
        let target = guard
            .target()
            .cloned()
            .ok_or(ResourceError::NoImportTarget)?;
        let already_owned = match self.owned.get(&target.guid) {
            Some(owner) if Arc::ptr_eq(owner, importer) => true,
            Some(_) => {
                log::error!(
                    "Refusing to reimport '{}': GUID {} now belongs to another importer",
                    target.path.display(),
                    target.guid
                );
                return Err(ResourceError::DuplicateGuid { guid: target.guid });
            }
            None => false,
        };
        if !already_owned {
            if self.registry.contains(&target.guid) {
                return Err(ResourceError::DuplicateGuid { guid: target.guid });
            }
            if let Some(bound) = self.path_index.resolve(&target.path) {
                if !Arc::ptr_eq(&bound, importer) {
                    return Err(ResourceError::PathOccupied { path: target.path });
                }
            }
        }

        let settings = settings.unwrap_or_else(|| target.settings.clone());
        let asset_type = self.extensions.classify_path(&target.path);

        let asset = guard.import(&target.path, asset_type, &settings)?;

        if self.config.write_meta_files && settings != target.settings {
            let stored = match meta::read_meta(&target.path) {
                Ok(stored) => stored,
                Err(e) => {
                    log::warn!(
                        "Rewriting unreadable sidecar of '{}', its labels are lost: {e}",
                        target.path.display()
                    );
                    None
                }
            };
            let mut metadata = stored.unwrap_or_else(|| {
                AssetMetadata::new(target.guid, asset_type, guard.kind(), settings.clone())
            });
            metadata.guid = target.guid;
            metadata.settings = settings.clone();
            meta::write_meta(&target.path, &metadata)?;
        }

        match self.registry.lookup(&target.guid) {
            Some(handle) => {
                handle.replace(asset);
            }
            None => self
                .registry
                .register(target.guid, AssetHandle::from_boxed(asset))?,
        }

        let guid = target.guid;
        let path = target.path.clone();
        guard.set_target(ImportTarget { settings, ..target });
        drop(guard);

        if !already_owned {
            self.path_index.bind(&path, importer);
            self.owned.insert(guid, importer.clone());
        }

        log::info!("Reimported '{}' ({guid})", path.display());
        self.notify_asset_changed();
        Ok(guid)
    }

    // --- Queries ---

    /// Returns a handle to the live asset registered under `guid`.
    pub fn lookup(&self, guid: &AssetGuid) -> Option<AssetHandle> {
        self.registry.lookup(guid)
    }

    /// Returns the live importer bound to `path`.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Option<SharedImporter> {
        let path = self.source_path(path.as_ref()).ok()?;
        self.path_index.resolve(&path)
    }

    /// The GUID of the asset imported from `path`, if it is loaded.
    pub fn guid_for_path(&self, path: impl AsRef<Path>) -> Option<AssetGuid> {
        let importer = self.resolve(path)?;
        let guid = lock(&importer).target().map(|target| target.guid);
        guid.filter(|guid| self.registry.contains(guid))
    }

    /// Number of loaded assets.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if no asset is loaded.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // --- Lifecycle ---

    /// Unloads the asset registered under `guid`.
    ///
    /// Handles already handed out stay valid. The importer is released and
    /// its path unbound, so the path resolves to nothing until it is imported
    /// again, even while someone else still holds the importer. Returns
    /// `false` if nothing was loaded under `guid`.
    pub fn unload(&mut self, guid: &AssetGuid) -> bool {
        let unregistered = self.registry.unregister(guid).is_some();
        let released = self.owned.remove(guid);
        if let Some(importer) = &released {
            let path = lock(importer).target().map(|target| target.path.clone());
            if let Some(path) = path {
                if self
                    .path_index
                    .resolve(&path)
                    .is_some_and(|bound| Arc::ptr_eq(&bound, importer))
                {
                    self.path_index.unbind(&path);
                }
            }
        }
        let released = released.is_some();
        if unregistered || released {
            log::info!("Unloaded asset {guid}");
        }
        unregistered || released
    }

    /// Moves a source file and its `.meta` sidecar, keeping its GUID.
    ///
    /// # Errors
    /// - [`ResourceError::NotImported`] if `from` has no live importer.
    /// - [`ResourceError::PathOccupied`] if `to` (or its sidecar) exists or is
    ///   bound to another importer. Nothing is moved.
    /// - [`ResourceError::Io`] if the file cannot be moved. A failed sidecar
    ///   move puts the source file back.
    pub fn move_asset(
        &mut self,
        from: impl AsRef<Path>,
        to: impl AsRef<Path>,
    ) -> Result<(), ResourceError> {
        let from = self.source_path(from.as_ref())?;
        let to = self.source_path(to.as_ref())?;
        let importer = self
            .path_index
            .resolve(&from)
            .ok_or_else(|| ResourceError::NotImported { path: from.clone() })?;
        if from == to {
            return Ok(());
        }
        if to.exists() || meta_path_for(&to).exists() || self.path_index.resolve(&to).is_some() {
            return Err(ResourceError::PathOccupied { path: to });
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|source| ResourceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::rename(&from, &to).map_err(|source| ResourceError::Io {
            path: from.clone(),
            source,
        })?;

        let from_meta = meta_path_for(&from);
        if from_meta.exists() {
            if let Err(source) = fs::rename(&from_meta, meta_path_for(&to)) {
                if let Err(e) = fs::rename(&to, &from) {
                    log::error!(
                        "Failed to restore '{}' after a failed move: {e}",
                        from.display()
                    );
                }
                return Err(ResourceError::Io {
                    path: from_meta,
                    source,
                });
            }
        }

        self.path_index.unbind(&from);
        self.path_index.bind(&to, &importer);
        {
            let mut guard = lock(&importer);
            if let Some(target) = guard.target().cloned() {
                guard.set_target(ImportTarget {
                    path: to.clone(),
                    ..target
                });
            }
        }
        if self.pending.remove(&from) {
            self.pending.insert(to.clone());
        }

        log::info!("Moved '{}' to '{}'", from.display(), to.display());
        Ok(())
    }

    /// Walks the assets root and imports every classified file that is not
    /// imported yet, using stored settings. Expired index entries are pruned.
    pub fn refresh(&mut self) -> Result<ImportReport, ResourceError> {
        let root = self.assets_directory()?.to_path_buf();
        let mut report = ImportReport::default();

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Skipping unreadable entry under '{}': {e}", root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() || is_meta_file(entry.path()) {
                continue;
            }

            let path = normalize_path(entry.path());
            if self.extensions.classify_path(&path) == AssetType::Unknown {
                report.skipped.push(path);
                continue;
            }
            if self.guid_for_path(&path).is_some() {
                report.unchanged += 1;
                continue;
            }

            match self.import_with_stored_settings(&path) {
                Ok(guid) => report.imported.push((path, guid)),
                Err(e) => {
                    log::warn!("Failed to import '{}': {e}", path.display());
                    report.failed.push((path, e));
                }
            }
        }

        self.path_index.prune();
        log::info!(
            "Refreshed '{}': {} imported, {} failed, {} skipped, {} unchanged",
            root.display(),
            report.imported.len(),
            report.failed.len(),
            report.skipped.len(),
            report.unchanged
        );
        Ok(report)
    }

    // --- Hot reload ---

    /// Queues `path` for [`process_pending`](Self::process_pending).
    ///
    /// Fires [`on_reimport_requested`](Self::on_reimport_requested) when the
    /// path was not queued already.
    pub fn request_reimport(&mut self, path: impl AsRef<Path>) -> Result<(), ResourceError> {
        let path = self.source_path(path.as_ref())?;
        if self.queue(path) {
            self.notify_reimport_requested();
        }
        Ok(())
    }

    fn queue(&mut self, path: PathBuf) -> bool {
        let queued = self.pending.insert(path);
        if queued {
            log::debug!("Queued {} pending reimports", self.pending.len());
        }
        queued
    }

    /// Paths waiting for [`process_pending`](Self::process_pending), sorted.
    pub fn pending(&self) -> Vec<PathBuf> {
        self.pending.iter().cloned().collect()
    }

    /// Applies the pending queue.
    ///
    /// Paths whose file is gone unload the asset bound to them and report its
    /// GUID. They are handled before anything else, so a file renamed
    /// together with its `.meta` keeps its GUID at the new path. Bound paths
    /// are then reimported and new classified files imported. Anything else
    /// is dropped. The queue is empty afterwards.
    pub fn process_pending(&mut self) -> Vec<(PathBuf, Result<AssetGuid, ResourceError>)> {
        let (removed, present): (Vec<PathBuf>, Vec<PathBuf>) =
            std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|path| !path.exists());
        let mut results = Vec::with_capacity(removed.len() + present.len());

        for path in removed {
            match self.guid_for_path(&path) {
                Some(guid) => {
                    self.unload(&guid);
                    log::info!("'{}' was removed, unloaded {guid}", path.display());
                    results.push((path, Ok(guid)));
                }
                None => log::debug!("Dropping pending path '{}'", path.display()),
            }
        }

        for path in present {
            let result = if self.path_index.resolve(&path).is_some() {
                self.reimport(&path)
            } else if path.is_file() && self.asset_type(&path) != AssetType::Unknown {
                self.import_with_stored_settings(&path)
            } else {
                log::debug!("Dropping pending path '{}'", path.display());
                continue;
            };
            if let Err(e) = &result {
                log::warn!("Failed to process '{}': {e}", path.display());
            }
            results.push((path, result));
        }
        results
    }

    /// Starts watching the assets root for changes.
    pub fn watch_assets(&mut self) -> Result<(), ResourceError> {
        let root = self.assets_directory()?.to_path_buf();
        self.watcher = Some(AssetWatcher::new(&root)?);
        Ok(())
    }

    /// Stops watching. Returns `false` if no watcher was running.
    pub fn stop_watching(&mut self) -> bool {
        self.watcher.take().is_some()
    }

    /// Returns `true` while a watcher is running.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Moves the changes observed by the watcher into the pending queue.
    ///
    /// Returns the number of newly queued paths and fires
    /// [`on_reimport_requested`](Self::on_reimport_requested) once if there
    /// were any.
    pub fn poll_watcher(&mut self) -> usize {
        let changed = match &self.watcher {
            Some(watcher) => watcher.drain(),
            None => return 0,
        };
        let queued = changed
            .into_iter()
            .filter(|path| self.queue(path.clone()))
            .count();
        if queued > 0 {
            self.notify_reimport_requested();
        }
        queued
    }

    // --- Notifications ---

    /// Fires after every successful import or reimport.
    pub fn on_asset_changed(&mut self) -> &mut Action {
        &mut self.asset_changed
    }

    /// Fires when a path is queued for reimport.
    pub fn on_reimport_requested(&mut self) -> &mut Action {
        &mut self.reimport_requested
    }

    fn notify_asset_changed(&self) {
        if let Err(e) = self.asset_changed.invoke() {
            log::warn!("Asset-changed notification: {e}");
        }
    }

    fn notify_reimport_requested(&self) {
        if let Err(e) = self.reimport_requested.invoke() {
            log::warn!("Reimport-requested notification: {e}");
        }
    }
}

impl Default for AssetDatabase {
    fn default() -> Self {
        Self::new(ResourcesConfig::default())
    }
}

impl fmt::Debug for AssetDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetDatabase")
            .field("directories", &self.resolver)
            .field("assets", &self.registry.len())
            .field("paths", &self.path_index.len())
            .field("pending", &self.pending.len())
            .field("watcher", &self.watcher)
            .finish_non_exhaustive()
    }
}
