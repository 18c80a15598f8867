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

//! Mesh import from OBJ and glTF sources.

use super::{lowercase_extension, read_bytes, AssetImporter, ImportTarget};
use crate::{
    assets::{MeshData, Model},
    error::ImportError,
};
use gltf::Gltf;
use khora_core::asset::{Asset, AssetType, ImportSettings, ImporterKind};
use std::{io::Cursor, path::Path};

/// Imports `.obj`, `.gltf` and `.glb` files into [`Model`] assets.
///
/// Other model extensions (such as `.fbx`) classify as models but have no
/// decoder here; importing them fails with [`ImportError::UnsupportedFormat`].
/// Applications with their own decoder register a replacement importer for
/// [`AssetType::Model`].
#[derive(Debug, Default)]
pub struct ModelImporter {
    target: Option<ImportTarget>,
}

impl ModelImporter {
    /// Creates an importer with no target yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn load_obj(path: &Path, bytes: &[u8]) -> Result<Vec<MeshData>, ImportError> {
        let (models, _materials) = tobj::load_obj_buf(
            &mut Cursor::new(bytes),
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
            // Materials are imported separately as native assets.
            |_| Ok(Default::default()),
        )
        .map_err(|e| ImportError::corrupt(path, format!("failed to parse OBJ: {e}")))?;

        Ok(models
            .into_iter()
            .map(|model| {
                let mesh = model.mesh;
                MeshData {
                    name: model.name,
                    positions: mesh
                        .positions
                        .chunks_exact(3)
                        .map(|v| [v[0], v[1], v[2]])
                        .collect(),
                    normals: (!mesh.normals.is_empty()).then(|| {
                        mesh.normals
                            .chunks_exact(3)
                            .map(|n| [n[0], n[1], n[2]])
                            .collect()
                    }),
                    tex_coords: (!mesh.texcoords.is_empty()).then(|| {
                        mesh.texcoords
                            .chunks_exact(2)
                            .map(|t| [t[0], t[1]])
                            .collect()
                    }),
                    indices: mesh.indices,
                }
            })
            .collect())
    }

    fn load_gltf(path: &Path, bytes: &[u8]) -> Result<Vec<MeshData>, ImportError> {
        let gltf = Gltf::from_slice(bytes)
            .map_err(|e| ImportError::corrupt(path, format!("failed to parse glTF: {e}")))?;
        let buffers = gltf::import_buffers(&gltf.document, path.parent(), gltf.blob.clone())
            .map_err(|e| match e {
                gltf::Error::Io(source) => ImportError::io(path, source),
                other => ImportError::corrupt(path, format!("failed to load glTF buffers: {other}")),
            })?;

        let mut meshes = Vec::new();
        for mesh in gltf.document.meshes() {
            let base_name = mesh.name().map(str::to_owned).unwrap_or_else(|| {
                format!("mesh{}", mesh.index())
            });
            for (i, primitive) in mesh.primitives().enumerate() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!(
                        "Skipping non-triangle primitive {i} of '{base_name}' in '{}'",
                        path.display()
                    );
                    continue;
                }

                let reader =
                    primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .ok_or_else(|| {
                        ImportError::corrupt(path, format!("mesh '{base_name}' has no positions"))
                    })?
                    .collect();
                let indices = match reader.read_indices() {
                    Some(indices) => indices.into_u32().collect(),
                    None => (0..positions.len() as u32).collect(),
                };

                meshes.push(MeshData {
                    name: if i == 0 {
                        base_name.clone()
                    } else {
                        format!("{base_name}.{i}")
                    },
                    normals: reader.read_normals().map(Iterator::collect),
                    tex_coords: reader.read_tex_coords(0).map(|t| t.into_f32().collect()),
                    positions,
                    indices,
                });
            }
        }
        Ok(meshes)
    }
}

/// Applies the import settings to decoded meshes.
fn post_process(meshes: &mut [MeshData], settings: &ImportSettings) {
    for mesh in meshes {
        if settings.scale != 1.0 {
            for p in &mut mesh.positions {
                for c in p.iter_mut() {
                    *c *= settings.scale;
                }
            }
        }
        if settings.generate_normals && mesh.normals.is_none() {
            mesh.normals = Some(smooth_normals(&mesh.positions, &mesh.indices));
        }
    }
}

/// Area-weighted vertex normals for an indexed triangle list.
fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![[0.0f32; 3]; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(pa), Some(pb), Some(pc)) = (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let u = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
        let v = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
        let n = [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ];
        for idx in [a, b, c] {
            for k in 0..3 {
                normals[idx][k] += n[k];
            }
        }
    }
    for n in &mut normals {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if len > f32::EPSILON {
            for c in n.iter_mut() {
                *c /= len;
            }
        }
    }
    normals
}

impl AssetImporter for ModelImporter {
    fn kind(&self) -> ImporterKind {
        ImporterKind::Model
    }

    fn supports(&self, asset_type: AssetType) -> bool {
        asset_type == AssetType::Model
    }

    fn import(
        &self,
        path: &Path,
        asset_type: AssetType,
        settings: &ImportSettings,
    ) -> Result<Box<dyn Asset>, ImportError> {
        if !self.supports(asset_type) {
            return Err(ImportError::unsupported(
                path,
                format!("{} cannot produce {asset_type} assets", self.kind()),
            ));
        }

        let extension = lowercase_extension(path);
        let mut meshes = match extension.as_str() {
            "obj" => Self::load_obj(path, &read_bytes(path)?)?,
            "gltf" | "glb" => Self::load_gltf(path, &read_bytes(path)?)?,
            other => {
                return Err(ImportError::unsupported(
                    path,
                    format!("no built-in decoder for '.{other}' models"),
                ))
            }
        };
        if meshes.is_empty() {
            return Err(ImportError::corrupt(path, "file contains no meshes"));
        }

        post_process(&mut meshes, settings);
        let model = Model { meshes };
        log::debug!(
            "Decoded model '{}' ({} meshes, {} triangles)",
            path.display(),
            model.meshes.len(),
            model.triangle_count()
        );
        Ok(Box::new(model))
    }

    fn target(&self) -> Option<&ImportTarget> {
        self.target.as_ref()
    }

    fn set_target(&mut self, target: ImportTarget) {
        self.target = Some(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportErrorKind;
    use std::fs;

    const QUAD_OBJ: &str = "o quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";

    fn import(path: &Path, settings: &ImportSettings) -> Result<Model, ImportError> {
        let asset = ModelImporter::new().import(path, AssetType::Model, settings)?;
        let asset: &dyn Asset = &*asset;
        Ok(asset.as_any().downcast_ref::<Model>().unwrap().clone())
    }

    #[test]
    fn test_obj_quad_is_triangulated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        fs::write(&path, QUAD_OBJ).unwrap();

        let model = import(&path, &ImportSettings::default()).unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.meshes[0].name, "quad");
        assert_eq!(model.vertex_count(), 4);
        assert_eq!(model.triangle_count(), 2);
        assert!(model.meshes[0].normals.is_none());
    }

    #[test]
    fn test_scale_and_generated_normals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        fs::write(&path, QUAD_OBJ).unwrap();

        let settings = ImportSettings {
            scale: 2.0,
            generate_normals: true,
            ..Default::default()
        };
        let model = import(&path, &settings).unwrap();
        let mesh = &model.meshes[0];
        assert!(mesh.positions.contains(&[2.0, 2.0, 0.0]));
        let normals = mesh.normals.as_ref().unwrap();
        assert_eq!(normals.len(), 4);
        for n in normals {
            assert!((n[2] - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_shared_vertices_get_area_weighted_normals() {
        // Two faces meeting at a right angle along the x axis; the vertical
        // one has twice the area.
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 2.0],
        ];
        let normals = smooth_normals(&positions, &[0, 1, 2, 0, 3, 1]);

        let s = 5.0f32.sqrt();
        for shared in [normals[0], normals[1]] {
            assert!((shared[0]).abs() < 1e-5);
            assert!((shared[1] - 2.0 / s).abs() < 1e-5);
            assert!((shared[2] - 1.0 / s).abs() < 1e-5);
        }
        assert_eq!(normals[2], [0.0, 0.0, 1.0]);
        assert_eq!(normals[3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_fbx_has_no_builtin_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.fbx");
        fs::write(&path, b"Kaydara FBX Binary").unwrap();

        let err = import(&path, &ImportSettings::default()).unwrap_err();
        assert_eq!(err.kind(), ImportErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_empty_obj_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.obj");
        fs::write(&path, "# nothing here\n").unwrap();

        let err = import(&path, &ImportSettings::default()).unwrap_err();
        assert_eq!(err.kind(), ImportErrorKind::CorruptData);
    }

    #[test]
    fn test_invalid_gltf_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.gltf");
        fs::write(&path, "{ not json").unwrap();

        let err = import(&path, &ImportSettings::default()).unwrap_err();
        assert_eq!(err.kind(), ImportErrorKind::CorruptData);
    }
}
