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
    asset::{Asset, AssetType},
    reflect::{type_mismatch, PropertyError, PropertyValue, Reflect},
};

/// A decoded image, stored as tightly packed RGBA8 rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `true` if the color data is sRGB-encoded.
    pub srgb: bool,
    /// `width * height * 4` bytes of RGBA8 data.
    pub pixels: Vec<u8>,
}

impl Texture {
    /// The RGBA value of the pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels
            .get(offset..offset + 4)
            .and_then(|p| p.try_into().ok())
    }
}

impl Asset for Texture {
    fn asset_type(&self) -> AssetType {
        AssetType::Texture
    }

    fn reflect(&self) -> Option<&dyn Reflect> {
        Some(self)
    }

    fn reflect_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(self)
    }
}

impl Reflect for Texture {
    fn type_name(&self) -> &'static str {
        "Texture"
    }

    fn fields(&self) -> Vec<(&'static str, PropertyValue)> {
        vec![
            ("width", PropertyValue::Int(self.width.into())),
            ("height", PropertyValue::Int(self.height.into())),
            ("srgb", PropertyValue::Bool(self.srgb)),
        ]
    }

    fn set_field(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "srgb" => match value {
                PropertyValue::Bool(srgb) => {
                    self.srgb = srgb;
                    Ok(())
                }
                other => Err(type_mismatch(name, "bool", &other)),
            },
            // Dimensions come from the source image.
            "width" | "height" => Err(PropertyError::ReadOnly {
                name: name.to_string(),
            }),
            _ => Err(PropertyError::UnknownField {
                name: name.to_string(),
            }),
        }
    }
}
