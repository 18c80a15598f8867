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

use super::{type_mismatch, PropertyError, PropertyValue};
use crate::asset::{Asset, AssetHandle};
use std::collections::BTreeMap;

/// A transient view of one field of a [`SerializedObject`].
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedProperty {
    /// The field name.
    pub name: String,
    /// The staged value if the field was modified, the asset's value otherwise.
    pub value: PropertyValue,
    /// `true` if the value is staged and not yet applied.
    pub modified: bool,
}

/// An inspector-facing wrapper over a live asset.
///
/// Edits are staged with [`set`](Self::set) and written back in one go by
/// [`apply_modified_properties`](Self::apply_modified_properties). The object
/// holds a strong [`AssetHandle`], so the asset stays valid for as long as the
/// view exists; it is never the asset's source of truth.
#[derive(Debug)]
pub struct SerializedObject {
    target: AssetHandle,
    staged: BTreeMap<String, PropertyValue>,
}

impl SerializedObject {
    /// Wraps `target`, failing if its type did not opt into reflection.
    pub fn new(target: AssetHandle) -> Result<Self, PropertyError> {
        {
            let guard = target.read();
            let asset: &dyn Asset = &**guard;
            if asset.reflect().is_none() {
                return Err(PropertyError::NotSerializable {
                    asset_type: asset.asset_type().to_string(),
                });
            }
        }
        Ok(Self {
            target,
            staged: BTreeMap::new(),
        })
    }

    /// The asset being inspected.
    pub fn target(&self) -> &AssetHandle {
        &self.target
    }

    fn current_fields(&self) -> Vec<(&'static str, PropertyValue)> {
        let guard = self.target.read();
        let asset: &dyn Asset = &**guard;
        asset.reflect().map(|r| r.fields()).unwrap_or_default()
    }

    /// All fields, with staged values overriding the asset's current ones.
    pub fn properties(&self) -> Vec<SerializedProperty> {
        self.current_fields()
            .into_iter()
            .map(|(name, value)| match self.staged.get(name) {
                Some(staged) => SerializedProperty {
                    name: name.to_string(),
                    value: staged.clone(),
                    modified: true,
                },
                None => SerializedProperty {
                    name: name.to_string(),
                    value,
                    modified: false,
                },
            })
            .collect()
    }

    /// Looks up a single field by name.
    pub fn find_property(&self, name: &str) -> Option<SerializedProperty> {
        self.properties().into_iter().find(|p| p.name == name)
    }

    /// Stages a new value for `name`.
    ///
    /// The field must exist and the value must be of the same variant as the
    /// field's current value; the asset itself is untouched until applied.
    pub fn set(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        let current = self
            .current_fields()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
            .ok_or_else(|| PropertyError::UnknownField {
                name: name.to_string(),
            })?;

        if std::mem::discriminant(&current) != std::mem::discriminant(&value) {
            return Err(type_mismatch(name, current.kind_name(), &value));
        }

        self.staged.insert(name.to_string(), value);
        Ok(())
    }

    /// Returns `true` if there are staged edits.
    pub fn has_modified_properties(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Writes every staged edit into the asset, returning how many were applied.
    ///
    /// Edits are applied in field-name order. On the first failure the error is
    /// returned; edits already applied stay applied and the rest stay staged.
    pub fn apply_modified_properties(&mut self) -> Result<usize, PropertyError> {
        let mut guard = self.target.write();
        let asset: &mut dyn Asset = &mut **guard;
        let asset_type = asset.asset_type();
        let reflect = asset
            .reflect_mut()
            .ok_or_else(|| PropertyError::NotSerializable {
                asset_type: asset_type.to_string(),
            })?;

        let mut applied = 0;
        while let Some((name, value)) = self.staged.pop_first() {
            if let Err(e) = reflect.set_field(&name, value.clone()) {
                self.staged.insert(name, value);
                return Err(e);
            }
            applied += 1;
        }
        if applied > 0 {
            log::debug!("Applied {applied} modified properties to {asset_type} asset");
        }
        Ok(applied)
    }

    /// Discards every staged edit.
    pub fn revert(&mut self) {
        self.staged.clear();
    }

    /// A name/value map of the current view, for the archive codec.
    pub fn snapshot(&self) -> BTreeMap<String, PropertyValue> {
        self.properties()
            .into_iter()
            .map(|p| (p.name, p.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetType;
    use crate::reflect::Reflect;

    struct TestMaterial {
        name: String,
        roughness: f64,
        double_sided: bool,
    }

    impl Asset for TestMaterial {
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

    impl Reflect for TestMaterial {
        fn type_name(&self) -> &'static str {
            "TestMaterial"
        }

        fn fields(&self) -> Vec<(&'static str, PropertyValue)> {
            vec![
                ("double_sided", PropertyValue::Bool(self.double_sided)),
                ("name", PropertyValue::Text(self.name.clone())),
                ("roughness", PropertyValue::Float(self.roughness)),
            ]
        }

        fn set_field(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
            match (name, value) {
                ("double_sided", PropertyValue::Bool(v)) => self.double_sided = v,
                ("name", PropertyValue::Text(v)) => self.name = v,
                ("roughness", PropertyValue::Float(v)) => self.roughness = v,
                (name @ ("double_sided" | "name" | "roughness"), value) => {
                    return Err(type_mismatch(name, "matching", &value))
                }
                (name, _) => {
                    return Err(PropertyError::UnknownField {
                        name: name.to_string(),
                    })
                }
            }
            Ok(())
        }
    }

    struct Opaque;

    impl Asset for Opaque {
        fn asset_type(&self) -> AssetType {
            AssetType::Script
        }
    }

    fn material() -> AssetHandle {
        AssetHandle::new(TestMaterial {
            name: "stone".to_string(),
            roughness: 0.5,
            double_sided: false,
        })
    }

    #[test]
    fn test_non_serializable_asset_is_rejected() {
        let err = SerializedObject::new(AssetHandle::new(Opaque)).unwrap_err();
        assert_eq!(
            err,
            PropertyError::NotSerializable {
                asset_type: "script".to_string()
            }
        );
    }

    #[test]
    fn test_properties_reflect_current_values() {
        let object = SerializedObject::new(material()).unwrap();
        let names: Vec<_> = object.properties().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["double_sided", "name", "roughness"]);

        let roughness = object.find_property("roughness").unwrap();
        assert_eq!(roughness.value, PropertyValue::Float(0.5));
        assert!(!roughness.modified);
        assert!(object.find_property("missing").is_none());
    }

    #[test]
    fn test_staged_edits_apply_to_asset() {
        let handle = material();
        let mut object = SerializedObject::new(handle.clone()).unwrap();

        object
            .set("roughness", PropertyValue::Float(0.9))
            .unwrap();
        assert!(object.has_modified_properties());
        assert!(object.find_property("roughness").unwrap().modified);
        // Not applied yet.
        assert_eq!(handle.with(|m: &TestMaterial| m.roughness), Some(0.5));

        assert_eq!(object.apply_modified_properties(), Ok(1));
        assert!(!object.has_modified_properties());
        assert_eq!(handle.with(|m: &TestMaterial| m.roughness), Some(0.9));
    }

    #[test]
    fn test_set_validates_name_and_type() {
        let mut object = SerializedObject::new(material()).unwrap();
        assert!(matches!(
            object.set("metalness", PropertyValue::Float(1.0)),
            Err(PropertyError::UnknownField { .. })
        ));
        assert!(matches!(
            object.set("name", PropertyValue::Int(3)),
            Err(PropertyError::TypeMismatch { expected: "text", found: "int", .. })
        ));
        assert!(!object.has_modified_properties());
    }

    #[test]
    fn test_revert_and_snapshot() {
        let mut object = SerializedObject::new(material()).unwrap();
        object
            .set("name", PropertyValue::Text("marble".to_string()))
            .unwrap();
        assert_eq!(
            object.snapshot().get("name"),
            Some(&PropertyValue::Text("marble".to_string()))
        );

        object.revert();
        assert_eq!(
            object.snapshot().get("name"),
            Some(&PropertyValue::Text("stone".to_string()))
        );
    }
}
