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

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// A globally unique, persistent identifier for an imported asset.
///
/// The GUID is minted once, the first time a source file is imported, and is
/// then written into the file's `.meta` companion. It represents the "idea" of
/// the asset, completely decoupled from its physical file path: the file can be
/// renamed or moved (together with its `.meta`) without breaking references to
/// it in scenes, materials or other assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetGuid(Uuid);

impl AssetGuid {
    /// Creates a new, random (version 4) `AssetGuid`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a deterministic (version 5) `AssetGuid` from a path string.
    ///
    /// Two calls with the same path always produce the same identifier. This is
    /// used by tooling that needs stable identities without `.meta` files.
    pub fn from_path(path: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, path.as_bytes()))
    }

    /// The all-zero identifier. Never minted for a real asset.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Returns `true` for the all-zero identifier.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AssetGuid {
    /// Creates a new, random (version 4) `AssetGuid`.
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for AssetGuid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for AssetGuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_guids_are_unique() {
        let a = AssetGuid::new();
        let b = AssetGuid::new();
        assert_ne!(a, b);
        assert!(!a.is_nil());
    }

    #[test]
    fn test_from_path_is_deterministic() {
        let a = AssetGuid::from_path("Assets/Textures/hero.png");
        let b = AssetGuid::from_path("Assets/Textures/hero.png");
        let c = AssetGuid::from_path("Assets/Textures/villain.png");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_parses_back() {
        let guid = AssetGuid::new();
        let parsed: AssetGuid = guid.to_string().parse().unwrap();
        assert_eq!(parsed, guid);
        assert!("not-a-guid".parse::<AssetGuid>().is_err());
    }
}
