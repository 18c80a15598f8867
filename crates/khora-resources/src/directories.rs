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

//! Canonical engine directories and filename lookup.
//!
//! The [`DirectoryResolver`] holds two independent roots:
//! - the **system root**, which contains engine content (`Engine/Shaders`, the
//!   bundled textures, models and fonts, and the `Example` project);
//! - the **assets root**, which contains the project's own content and is the
//!   scope of [`DirectoryResolver::find_asset_file`].
//!
//! The directory getters are pure path concatenations: they never touch the
//! filesystem and may return paths that do not exist.

use crate::error::ResourceError;
use std::{
    env,
    path::{Component, Path, PathBuf},
};
use walkdir::WalkDir;

/// Shader sources, relative to the system root.
pub const SHADER_DIR: &str = "Engine/Shaders";
/// Shader include files, relative to the system root.
pub const SHADER_INCLUDE_DIR: &str = "Engine/Shaders/include";
/// Bundled textures, relative to the system root.
pub const TEXTURE_DIR: &str = "Assets/Textures";
/// Bundled models, relative to the system root.
pub const MODEL_DIR: &str = "Assets/Models";
/// Bundled fonts, relative to the system root.
pub const FONT_DIR: &str = "Assets/Fonts";
/// The example project, relative to the system root.
pub const EXAMPLE_DIR: &str = "Example";

/// Lexically normalises a path: drops `.` components and resolves `..`
/// against the preceding component. Never touches the filesystem.
///
/// A `..` directly under the root is dropped; a leading `..` on a relative
/// path is kept since there is nothing to resolve it against.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Makes `path` absolute against the working directory, then normalises it.
pub fn absolute_path(path: &Path) -> Result<PathBuf, ResourceError> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    let cwd = env::current_dir().map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(normalize_path(&cwd.join(path)))
}

/// Returns the nearest ancestor of `start` (including `start`) that contains
/// the `Engine/Shaders` marker directory.
pub fn find_marked_ancestor(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(SHADER_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Derives the system root when none is configured.
///
/// The ancestors of the running executable's directory are searched first,
/// nearest first, then the ancestors of the working directory. The first one
/// containing `Engine/Shaders` wins. If none does, the working directory is
/// the root.
pub fn discover_system_root() -> Result<PathBuf, ResourceError> {
    let cwd = env::current_dir().map_err(|source| ResourceError::Io {
        path: PathBuf::from("."),
        source,
    })?;

    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    let found = exe_dir
        .as_deref()
        .and_then(find_marked_ancestor)
        .or_else(|| find_marked_ancestor(&cwd));

    match found {
        Some(root) => Ok(normalize_path(&root)),
        None => {
            log::warn!(
                "No '{}' marker found near the executable or working directory; using '{}' as system root",
                SHADER_DIR,
                cwd.display()
            );
            Ok(normalize_path(&cwd))
        }
    }
}

/// Searches `root` for a file whose path ends with `filename`.
///
/// `filename` is a bare file name or a relative path (`Textures/hero.png`).
/// When several files match, the shallowest one wins, and among equally deep
/// matches the lexicographically smallest path wins, so the result only
/// depends on the directory contents.
pub fn find_file_in(root: &Path, filename: &str) -> Option<PathBuf> {
    let needle = Path::new(filename);
    let well_formed = needle.components().next().is_some()
        && needle
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !well_formed {
        log::debug!("Rejecting malformed lookup name '{filename}'");
        return None;
    }

    let mut best: Option<(usize, PathBuf)> = None;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry under '{}': {e}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .strip_prefix(root)
            .map(|relative| relative.ends_with(needle))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let candidate = (entry.depth(), entry.into_path());
        best = match best {
            Some(current) if current <= candidate => Some(current),
            _ => Some(candidate),
        };
    }

    best.map(|(_, path)| path)
}

/// Computes canonical engine directories and resolves file names.
///
/// # Preconditions
/// [`init`](Self::init) must run before any system-directory getter or
/// [`find_system_file`](Self::find_system_file), and
/// [`set_assets_directory`](Self::set_assets_directory) before
/// [`find_asset_file`](Self::find_asset_file). Violations are reported as
/// [`ResourceError::NotInitialized`].
#[derive(Debug, Clone, Default)]
pub struct DirectoryResolver {
    system_root: Option<PathBuf>,
    assets_root: Option<PathBuf>,
}

impl DirectoryResolver {
    /// Creates an uninitialised resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Establishes the system root.
    ///
    /// An empty `root` triggers [`discover_system_root`]. Calling `init` again
    /// replaces the root; paths computed before that call are stale.
    pub fn init(&mut self, root: impl AsRef<Path>) -> Result<&Path, ResourceError> {
        let root = root.as_ref();
        let resolved = if root.as_os_str().is_empty() {
            discover_system_root()?
        } else {
            absolute_path(root)?
        };
        log::info!("System root set to '{}'", resolved.display());
        let root: &Path = self.system_root.insert(resolved);
        Ok(root)
    }

    /// Returns `true` once a system root is set.
    pub fn is_initialized(&self) -> bool {
        self.system_root.is_some()
    }

    /// The system root.
    pub fn system_root(&self) -> Result<&Path, ResourceError> {
        self.system_root
            .as_deref()
            .ok_or(ResourceError::NotInitialized {
                what: "system root directory",
            })
    }

    fn system_dir(&self, relative: &str) -> Result<PathBuf, ResourceError> {
        self.system_root().map(|root| root.join(relative))
    }

    /// `<system root>/Engine/Shaders`.
    pub fn shader_root_directory(&self) -> Result<PathBuf, ResourceError> {
        self.system_dir(SHADER_DIR)
    }

    /// `<system root>/Engine/Shaders/include`.
    pub fn shader_header_directory(&self) -> Result<PathBuf, ResourceError> {
        self.system_dir(SHADER_INCLUDE_DIR)
    }

    /// `<system root>/Assets/Textures`.
    pub fn texture_root_directory(&self) -> Result<PathBuf, ResourceError> {
        self.system_dir(TEXTURE_DIR)
    }

    /// `<system root>/Assets/Models`.
    pub fn model_root_directory(&self) -> Result<PathBuf, ResourceError> {
        self.system_dir(MODEL_DIR)
    }

    /// `<system root>/Assets/Fonts`.
    pub fn font_root_directory(&self) -> Result<PathBuf, ResourceError> {
        self.system_dir(FONT_DIR)
    }

    /// `<system root>/Example`.
    pub fn example_root_directory(&self) -> Result<PathBuf, ResourceError> {
        self.system_dir(EXAMPLE_DIR)
    }

    /// Sets the project assets root, independent of the system root.
    pub fn set_assets_directory(&mut self, path: impl AsRef<Path>) -> Result<(), ResourceError> {
        let resolved = absolute_path(path.as_ref())?;
        log::info!("Assets directory set to '{}'", resolved.display());
        self.assets_root = Some(resolved);
        Ok(())
    }

    /// The project assets root.
    pub fn assets_directory(&self) -> Result<&Path, ResourceError> {
        self.assets_root
            .as_deref()
            .ok_or(ResourceError::NotInitialized {
                what: "assets directory",
            })
    }

    /// Searches the assets tree for `filename`. See [`find_file_in`] for the
    /// matching and tie-break rules.
    ///
    /// `Ok(None)` means the file does not exist in the tree.
    pub fn find_asset_file(&self, filename: &str) -> Result<Option<PathBuf>, ResourceError> {
        let root = self.assets_directory()?;
        let found = find_file_in(root, filename);
        log::trace!("find_asset_file('{filename}') -> {found:?}");
        Ok(found)
    }

    /// Searches the system tree for `filename`, with the same rules as
    /// [`find_asset_file`](Self::find_asset_file).
    pub fn find_system_file(&self, filename: &str) -> Result<Option<PathBuf>, ResourceError> {
        let root = self.system_root()?;
        let found = find_file_in(root, filename);
        log::trace!("find_system_file('{filename}') -> {found:?}");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/repo/./Assets/../Engine/Shaders")),
            PathBuf::from("/repo/Engine/Shaders")
        );
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("../a/./b/..")), PathBuf::from("../a"));
        assert_eq!(normalize_path(Path::new("a/b/../../..")), PathBuf::from(".."));
    }

    #[test]
    fn test_getters_require_init() {
        let resolver = DirectoryResolver::new();
        assert!(!resolver.is_initialized());
        assert!(matches!(
            resolver.shader_root_directory(),
            Err(ResourceError::NotInitialized { .. })
        ));
        assert!(matches!(
            resolver.find_asset_file("hero.png"),
            Err(ResourceError::NotInitialized { .. })
        ));
    }

    #[test]
    fn test_directory_getters_append_fixed_suffixes() {
        let mut resolver = DirectoryResolver::new();
        resolver.init("/repo/Engine").unwrap();

        let root = PathBuf::from("/repo/Engine");
        assert_eq!(
            resolver.shader_root_directory().unwrap(),
            root.join("Engine/Shaders")
        );
        assert_eq!(
            resolver.shader_header_directory().unwrap(),
            root.join("Engine/Shaders/include")
        );
        assert_eq!(
            resolver.texture_root_directory().unwrap(),
            root.join("Assets/Textures")
        );
        assert_eq!(resolver.model_root_directory().unwrap(), root.join("Assets/Models"));
        assert_eq!(resolver.font_root_directory().unwrap(), root.join("Assets/Fonts"));
        assert_eq!(resolver.example_root_directory().unwrap(), root.join("Example"));

        // Pure: repeated calls agree.
        assert_eq!(
            resolver.shader_root_directory().unwrap(),
            resolver.shader_root_directory().unwrap()
        );
    }

    #[test]
    fn test_reinit_replaces_root() {
        let mut resolver = DirectoryResolver::new();
        resolver.init("/first/./root").unwrap();
        assert_eq!(resolver.system_root().unwrap(), Path::new("/first/root"));

        resolver.init("/second").unwrap();
        assert_eq!(
            resolver.font_root_directory().unwrap(),
            PathBuf::from("/second/Assets/Fonts")
        );
    }

    #[test]
    fn test_find_marked_ancestor() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("engine");
        fs::create_dir_all(root.join(SHADER_DIR)).unwrap();
        let nested = root.join("target/debug/deps");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_marked_ancestor(&nested), Some(root.clone()));
        assert_eq!(find_marked_ancestor(&root), Some(root));
        assert_eq!(find_marked_ancestor(dir.path()), None);
    }

    #[test]
    fn test_find_asset_file() {
        let dir = tempdir().unwrap();
        let assets = dir.path().join("Assets");
        touch(&assets.join("Textures/hero.png"));

        let mut resolver = DirectoryResolver::new();
        resolver.set_assets_directory(&assets).unwrap();

        assert_eq!(
            resolver.find_asset_file("hero.png").unwrap(),
            Some(assets.join("Textures/hero.png"))
        );
        assert_eq!(
            resolver.find_asset_file("Textures/hero.png").unwrap(),
            Some(assets.join("Textures/hero.png"))
        );
        assert_eq!(resolver.find_asset_file("villain.png").unwrap(), None);
        assert_eq!(resolver.find_asset_file("../hero.png").unwrap(), None);
        assert_eq!(resolver.find_asset_file("").unwrap(), None);
    }

    #[test]
    fn test_find_prefers_shallowest_then_lexicographic() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a/deep/nested/rock.png"));
        touch(&root.join("z/rock.png"));
        touch(&root.join("b/rock.png"));

        assert_eq!(find_file_in(root, "rock.png"), Some(root.join("b/rock.png")));

        touch(&root.join("rock.png"));
        assert_eq!(find_file_in(root, "rock.png"), Some(root.join("rock.png")));
    }

    #[test]
    fn test_find_system_file_is_scoped_to_system_root() {
        let dir = tempdir().unwrap();
        let system = dir.path().join("system");
        let assets = dir.path().join("assets");
        touch(&system.join(SHADER_INCLUDE_DIR).join("common.inc"));
        touch(&assets.join("player.lua"));

        let mut resolver = DirectoryResolver::new();
        resolver.init(&system).unwrap();
        resolver.set_assets_directory(&assets).unwrap();

        assert_eq!(
            resolver.find_system_file("common.inc").unwrap(),
            Some(system.join(SHADER_INCLUDE_DIR).join("common.inc"))
        );
        assert_eq!(resolver.find_system_file("player.lua").unwrap(), None);
        assert_eq!(resolver.find_asset_file("common.inc").unwrap(), None);
    }
}
