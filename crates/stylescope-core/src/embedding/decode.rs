//! Image loading with size limits and content-based format detection.

use image::{DynamicImage, GenericImageView};
use std::io::Cursor;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::ClassifyError;

/// Reads and decodes images from disk, enforcing [`LimitsConfig`].
#[derive(Debug, Clone)]
pub struct ImageLoader {
    limits: LimitsConfig,
}

impl ImageLoader {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Load and decode an image.
    ///
    /// Every failure (missing file, oversized file, unknown format, corrupt
    /// data, oversized dimensions) is reported as [`ClassifyError::ImageLoad`].
    pub fn load(&self, path: &Path) -> Result<DynamicImage, ClassifyError> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| ClassifyError::image_load(path, format!("Cannot read file: {e}")))?;
        if !metadata.is_file() {
            return Err(ClassifyError::image_load(path, "Not a regular file"));
        }

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(ClassifyError::image_load(
                path,
                format!(
                    "File too large ({}MB > {}MB)",
                    metadata.len() / (1024 * 1024),
                    self.limits.max_file_size_mb
                ),
            ));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| ClassifyError::image_load(path, format!("Cannot read file: {e}")))?;
        let image = Self::decode_bytes(bytes, path)?;

        let (width, height) = image.dimensions();
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(ClassifyError::image_load(
                path,
                format!(
                    "Image too large ({}x{} > {})",
                    width, height, self.limits.max_image_dimension
                ),
            ));
        }
        if width == 0 || height == 0 {
            return Err(ClassifyError::image_load(path, "Image has no pixels"));
        }

        tracing::trace!("Decoded {:?} ({}x{})", path, width, height);
        Ok(image)
    }

    /// Decode from bytes, detecting the format from content before extension.
    fn decode_bytes(bytes: Vec<u8>, path: &Path) -> Result<DynamicImage, ClassifyError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| {
                ClassifyError::image_load(path, format!("Cannot detect image format: {e}"))
            })?;
        if reader.format().is_none() {
            return Err(ClassifyError::image_load(path, "Unrecognized image format"));
        }
        reader
            .decode()
            .map_err(|e| ClassifyError::image_load(path, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    #[test]
    fn test_load_valid_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "ok.png", 40, 30);
        let image = ImageLoader::new(LimitsConfig::default()).load(&path).unwrap();
        assert_eq!(image.dimensions(), (40, 30));
    }

    #[test]
    fn test_format_detected_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "misnamed.jpg", 8, 8);
        assert!(ImageLoader::new(LimitsConfig::default()).load(&path).is_ok());
    }

    #[test]
    fn test_missing_file_is_image_load_error() {
        let err = ImageLoader::new(LimitsConfig::default())
            .load(Path::new("/nonexistent/look.jpg"))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::ImageLoad { .. }));
    }

    #[test]
    fn test_corrupt_file_is_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();
        let err = ImageLoader::new(LimitsConfig::default())
            .load(&path)
            .unwrap_err();
        assert!(matches!(err, ClassifyError::ImageLoad { .. }));
    }

    #[test]
    fn test_dimension_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 64, 8);
        let limits = LimitsConfig {
            max_image_dimension: 32,
            ..LimitsConfig::default()
        };
        let err = ImageLoader::new(limits).load(&path).unwrap_err();
        assert!(err.to_string().contains("Image too large"));
    }
}
