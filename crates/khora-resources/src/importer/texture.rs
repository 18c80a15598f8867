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

//! Image decoding into [`Texture`] assets.

use super::{read_bytes, AssetImporter, ImportTarget};
use crate::{assets::Texture, error::ImportError};
use image::ImageError;
use khora_core::asset::{Asset, AssetType, ImportSettings, ImporterKind};
use std::path::Path;

/// Decodes image files with the `image` crate into RGBA8 textures.
///
/// The container format is sniffed from the file content, so a PNG saved with
/// a `.jpg` extension still imports.
#[derive(Debug, Default)]
pub struct TextureImporter {
    target: Option<ImportTarget>,
}

impl TextureImporter {
    /// Creates an importer with no target yet.
    pub fn new() -> Self {
        Self::default()
    }
}

fn map_image_error(path: &Path, error: ImageError) -> ImportError {
    match error {
        ImageError::Unsupported(e) => ImportError::unsupported(path, e.to_string()),
        ImageError::IoError(e) => ImportError::io(path, e),
        other => ImportError::corrupt(path, other.to_string()),
    }
}

impl AssetImporter for TextureImporter {
    fn kind(&self) -> ImporterKind {
        ImporterKind::Texture
    }

    fn supports(&self, asset_type: AssetType) -> bool {
        asset_type == AssetType::Texture
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

        let bytes = read_bytes(path)?;
        let mut image = image::load_from_memory(&bytes).map_err(|e| map_image_error(path, e))?;
        if settings.flip_vertical {
            image = image.flipv();
        }

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!(
            "Decoded texture '{}' ({width}x{height})",
            path.display()
        );

        Ok(Box::new(Texture {
            width,
            height,
            srgb: settings.srgb,
            pixels: rgba.into_raw(),
        }))
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
    use image::{ImageBuffer, Rgba};
    use std::fs;

    fn write_png(path: &Path) {
        // Red top row, blue bottom row.
        let img = ImageBuffer::from_fn(2, 2, |_, y| {
            if y == 0 {
                Rgba([255u8, 0, 0, 255])
            } else {
                Rgba([0u8, 0, 255, 255])
            }
        });
        img.save(path).unwrap();
    }

    fn import(path: &Path, settings: &ImportSettings) -> Result<Texture, ImportError> {
        let asset = TextureImporter::new().import(path, AssetType::Texture, settings)?;
        let asset: &dyn Asset = &*asset;
        Ok(asset.as_any().downcast_ref::<Texture>().unwrap().clone())
    }

    #[test]
    fn test_png_decodes_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        write_png(&path);

        let texture = import(&path, &ImportSettings::default()).unwrap();
        assert_eq!((texture.width, texture.height), (2, 2));
        assert_eq!(texture.pixels.len(), 16);
        assert_eq!(texture.pixel(0, 0), Some([255, 0, 0, 255]));
        assert!(texture.srgb);
    }

    #[test]
    fn test_flip_vertical_setting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        write_png(&path);

        let settings = ImportSettings {
            flip_vertical: true,
            srgb: false,
            ..Default::default()
        };
        let texture = import(&path, &settings).unwrap();
        assert_eq!(texture.pixel(0, 0), Some([0, 0, 255, 255]));
        assert!(!texture.srgb);
    }

    #[test]
    fn test_garbage_content_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.png");
        fs::write(&path, b"definitely not an image").unwrap();

        let err = import(&path, &ImportSettings::default()).unwrap_err();
        assert_ne!(err.kind(), ImportErrorKind::IoFailure);
        assert_eq!(err.path(), path);
    }

    #[test]
    fn test_missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = import(&dir.path().join("absent.png"), &ImportSettings::default()).unwrap_err();
        assert_eq!(err.kind(), ImportErrorKind::IoFailure);
    }

    #[test]
    fn test_wrong_asset_type_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        write_png(&path);

        let err = TextureImporter::new()
            .import(&path, AssetType::Model, &ImportSettings::default())
            .err().expect("expected import to fail");
        assert_eq!(err.kind(), ImportErrorKind::UnsupportedFormat);
    }
}
