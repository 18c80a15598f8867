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

use khora_core::{
    asset::{Asset, AssetGuid, AssetType},
    reflect::{type_mismatch, PropertyError, PropertyValue, Reflect},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An engine-native material, stored on disk as RON.
///
/// ```ron
/// (
///     name: "stone",
///     shader: "PBR.shader",
///     base_color: (0.8, 0.8, 0.8, 1.0),
///     roughness: 0.7,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Display name.
    pub name: String,
    /// Shader file name, resolved through the shader root. Empty selects the default shader.
    pub shader: String,
    /// Linear RGBA base color.
    pub base_color: [f32; 4],
    /// Perceptual roughness in `[0, 1]`.
    pub roughness: f32,
    /// Metalness in `[0, 1]`.
    pub metallic: f32,
    /// Texture slots, by slot name.
    pub textures: BTreeMap<String, AssetGuid>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            shader: String::new(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            roughness: 0.5,
            metallic: 0.0,
            textures: BTreeMap::new(),
        }
    }
}

impl Asset for Material {
    fn asset_type(&self) -> AssetType {
        AssetType::Material
    }

    fn reflect(&self) -> Option<&dyn Reflect> {
        Some(self)
    }

    fn reflect_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(self)
    }
}

impl Reflect for Material {
    fn type_name(&self) -> &'static str {
        "Material"
    }

    fn fields(&self) -> Vec<(&'static str, PropertyValue)> {
        vec![
            ("name", PropertyValue::Text(self.name.clone())),
            ("shader", PropertyValue::Text(self.shader.clone())),
            ("base_color", PropertyValue::Floats(self.base_color.to_vec())),
            ("roughness", PropertyValue::Float(self.roughness.into())),
            ("metallic", PropertyValue::Float(self.metallic.into())),
        ]
    }

    fn set_field(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match (name, value) {
            ("name", PropertyValue::Text(v)) => self.name = v,
            ("shader", PropertyValue::Text(v)) => self.shader = v,
            ("base_color", PropertyValue::Floats(v)) => {
                self.base_color = v
                    .as_slice()
                    .try_into()
                    .map_err(|_| type_mismatch(name, "floats[4]", &PropertyValue::Floats(v)))?;
            }
            ("roughness", PropertyValue::Float(v)) => self.roughness = v as f32,
            ("metallic", PropertyValue::Float(v)) => self.metallic = v as f32,
            ("name" | "shader", other) => return Err(type_mismatch(name, "text", &other)),
            ("base_color", other) => return Err(type_mismatch(name, "floats", &other)),
            ("roughness" | "metallic", other) => {
                return Err(type_mismatch(name, "float", &other))
            }
            _ => {
                return Err(PropertyError::UnknownField {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_fields_round_trip_through_reflect() {
        let mut material = Material::default();
        material
            .set_field("roughness", PropertyValue::Float(0.25))
            .unwrap();
        material
            .set_field("base_color", PropertyValue::Floats(vec![1.0, 0.0, 0.0, 1.0]))
            .unwrap();

        assert_eq!(material.field("roughness"), Some(PropertyValue::Float(0.25)));
        assert_eq!(material.base_color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_material_rejects_bad_values() {
        let mut material = Material::default();
        assert!(matches!(
            material.set_field("base_color", PropertyValue::Floats(vec![1.0])),
            Err(PropertyError::TypeMismatch { .. })
        ));
        assert!(matches!(
            material.set_field("roughness", PropertyValue::Bool(true)),
            Err(PropertyError::TypeMismatch { .. })
        ));
        assert!(matches!(
            material.set_field("emission", PropertyValue::Float(1.0)),
            Err(PropertyError::UnknownField { .. })
        ));
    }
}
