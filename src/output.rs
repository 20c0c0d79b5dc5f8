use crate::config::OutputSettings;
use crate::error::{PipelineError, Result};

use image::{ImageFormat, RgbImage, codecs::jpeg::JpegEncoder};
use log::info;
use std::{fs, io::BufWriter, path::Path};

/// Default artifact name when the caller does not choose one.
pub const DEFAULT_OUTPUT_PATH: &str = "corrected_image.jpg";

/// Encode an RGB image as JPEG in memory.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(image)
        .map_err(|e| PipelineError::EncodeFailure(e.to_string()))?;
    Ok(bytes)
}

/// Write the annotated image to `path`, choosing the format from its extension.
///
/// JPEG output honours `settings.jpeg_quality`. Parent directories are created.
pub fn save_annotated(image: &RgbImage, path: &Path, settings: &OutputSettings) -> Result<()> {
    let format = ImageFormat::from_path(path).map_err(|e| {
        PipelineError::EncodeFailure(format!("unsupported output path {}: {e}", path.display()))
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            PipelineError::EncodeFailure(format!("failed to create {}: {e}", parent.display()))
        })?;
    }

    let result = if format == ImageFormat::Jpeg {
        let file = fs::File::create(path).map_err(|e| {
            PipelineError::EncodeFailure(format!("failed to create {}: {e}", path.display()))
        })?;
        JpegEncoder::new_with_quality(BufWriter::new(file), settings.jpeg_quality.clamp(1, 100))
            .encode_image(image)
    } else {
        image.save_with_format(path, format)
    };
    result.map_err(|e| {
        PipelineError::EncodeFailure(format!("failed to write {}: {e}", path.display()))
    })?;

    info!("Saved {}", path.display());
    Ok(())
}
