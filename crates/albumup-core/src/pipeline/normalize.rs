//! Image normalization: decode, bound, and re-encode into scratch storage.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::NormalizeConfig;
use crate::error::PipelineError;
use crate::scratch::ScratchDir;
use crate::types::{NormalizedAsset, SourceImage};

/// Normalizes source images into bounded JPEGs in scratch storage.
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    /// Create a new normalizer with the given settings.
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Normalize one source image, writing the result into `scratch`.
    ///
    /// `seq` is the file's discovery index, used for a collision-free
    /// scratch name. Decoding and encoding are CPU-bound, so they run in
    /// `spawn_blocking` under a timeout.
    pub async fn normalize(
        &self,
        source: &SourceImage,
        scratch: &ScratchDir,
        seq: usize,
    ) -> Result<NormalizedAsset, PipelineError> {
        let src_path = source.path.clone();
        let dst_path = scratch.asset_path(seq, &source.path);
        let config = self.config.clone();
        let timeout_duration = Duration::from_millis(self.config.timeout_ms);

        let result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || normalize_sync(&config, &src_path, &dst_path))
                .await
        })
        .await;

        match result {
            Ok(Ok(normalized)) => normalized,
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: source.path.clone(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: source.path.clone(),
                stage: "normalize".to_string(),
                timeout_ms: self.config.timeout_ms,
            }),
        }
    }
}

/// Synchronous decode-resize-encode (runs in spawn_blocking).
fn normalize_sync(
    config: &NormalizeConfig,
    src: &Path,
    dst: &Path,
) -> Result<NormalizedAsset, PipelineError> {
    let bytes = std::fs::read(src).map_err(|e| PipelineError::Unsupported {
        path: src.to_path_buf(),
        message: e.to_string(),
    })?;

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Unsupported {
            path: src.to_path_buf(),
            message: format!("Cannot detect image format: {}", e),
        })?;
    if reader.format().is_none() {
        return Err(PipelineError::Unsupported {
            path: src.to_path_buf(),
            message: "not a recognized image format".to_string(),
        });
    }

    let image = reader.decode().map_err(|e| PipelineError::Decode {
        path: src.to_path_buf(),
        message: e.to_string(),
    })?;

    // JPEG encodes plain RGB and grayscale; everything else converts first
    let image = match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let (width, height) = image.dimensions();
    let image = if width.max(height) > config.max_dimension {
        image.resize(
            config.max_dimension,
            config.max_dimension,
            FilterType::Lanczos3,
        )
    } else {
        image
    };
    let (out_width, out_height) = image.dimensions();

    let mut encoded = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut encoded, config.jpeg_quality);
    image
        .write_with_encoder(encoder)
        .map_err(|e| PipelineError::Encode {
            path: src.to_path_buf(),
            message: e.to_string(),
        })?;

    std::fs::write(dst, &encoded).map_err(|e| PipelineError::Scratch {
        path: dst.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(NormalizedAsset {
        path: dst.to_path_buf(),
        size: encoded.len() as u64,
        width: out_width,
        height: out_height,
    })
}
