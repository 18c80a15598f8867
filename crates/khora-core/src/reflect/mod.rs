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

//! The contract between assets and the inspector / archive codec.
//!
//! An asset type is serializable when it implements [`Reflect`] and exposes it
//! through [`Asset::reflect`](crate::asset::Asset::reflect). This is a
//! registration-time capability: nothing is discovered through runtime
//! attributes, and types that never opt in cannot be wrapped in a
//! [`SerializedObject`].

mod serialized;

pub use serialized::{SerializedObject, SerializedProperty};

use crate::asset::AssetGuid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A generically typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A UTF-8 string.
    Text(String),
    /// A reference to another asset.
    Guid(AssetGuid),
    /// A small float vector (colors, offsets, ...).
    Floats(Vec<f32>),
}

impl PropertyValue {
    /// A short name for the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::Text(_) => "text",
            PropertyValue::Guid(_) => "guid",
            PropertyValue::Floats(_) => "floats",
        }
    }
}

/// An error raised while reading or writing reflected fields.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// The asset type does not implement [`Reflect`].
    NotSerializable {
        /// The category of the rejected asset.
        asset_type: String,
    },
    /// The type has no field with that name.
    UnknownField {
        /// The requested field name.
        name: String,
    },
    /// The value variant does not match the field's type.
    TypeMismatch {
        /// The field being written.
        name: String,
        /// The variant the field accepts.
        expected: &'static str,
        /// The variant that was supplied.
        found: &'static str,
    },
    /// The field exists but cannot be written.
    ReadOnly {
        /// The field being written.
        name: String,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyError::NotSerializable { asset_type } => {
                write!(f, "Asset of type '{asset_type}' is not serializable")
            }
            PropertyError::UnknownField { name } => write!(f, "Unknown field '{name}'"),
            PropertyError::TypeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "Field '{name}' expects a {expected} value but got {found}"
            ),
            PropertyError::ReadOnly { name } => write!(f, "Field '{name}' is read-only"),
        }
    }
}

impl std::error::Error for PropertyError {}

/// Generic field access for serializable types.
pub trait Reflect {
    /// A human-readable name for the concrete type.
    fn type_name(&self) -> &'static str;

    /// Every exposed field, in a stable declaration order.
    fn fields(&self) -> Vec<(&'static str, PropertyValue)>;

    /// Reads a single field.
    fn field(&self, name: &str) -> Option<PropertyValue> {
        self.fields()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Writes a single field.
    fn set_field(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError>;
}

/// Builds a [`PropertyError::TypeMismatch`] for `name`.
pub fn type_mismatch(name: &str, expected: &'static str, found: &PropertyValue) -> PropertyError {
    PropertyError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.kind_name(),
    }
}
