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

use khora_core::asset::{Asset, AssetType};

/// One drawable mesh of a [`Model`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// The mesh name from the source file.
    pub name: String,
    /// Vertex positions, already scaled by the import settings.
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals, if present or generated.
    pub normals: Option<Vec<[f32; 3]>>,
    /// First UV channel, if present.
    pub tex_coords: Option<Vec<[f32; 2]>>,
    /// Triangle list indices into the vertex arrays.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of triangles in the index list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A set of meshes imported from a single model file.
///
/// Models are not reflected: the inspector shows them through their import
/// settings, not field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// The meshes, in source order.
    pub meshes: Vec<MeshData>,
}

impl Model {
    /// Total vertex count over all meshes.
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }

    /// Total triangle count over all meshes.
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }
}

impl Asset for Model {
    fn asset_type(&self) -> AssetType {
        AssetType::Model
    }
}
