//! Dark-channel-prior haze removal.
//!
//! `dehaze` runs the full transform; the submodules expose each stage so the
//! intermediate maps can be inspected or reused.

pub mod atmospheric;
pub mod blur;
pub mod dark_channel;
pub mod radiance;
pub mod transmission;

pub use atmospheric::AtmosphericLight;

use crate::config::DehazeParams;
use crate::error::{PipelineError, Result};
use image::{ColorType, DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};
use log::debug;

/// Single-channel floating point grid (used for the transmission map).
pub type FloatMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Intermediate results of one dehaze run.
#[derive(Debug, Clone)]
pub struct DehazeMaps {
    pub dark_channel: GrayImage,
    pub atmospheric_light: AtmosphericLight,
    /// Smoothed transmission clamped to `[t_min, 1]`, as used for recovery.
    pub transmission: FloatMap,
}

/// Check that the input is a non-empty 3-channel 8-bit image and borrow it.
pub fn require_rgb8(image: &DynamicImage) -> Result<&RgbImage> {
    let color = image.color();
    match image {
        DynamicImage::ImageRgb8(rgb) if rgb.width() > 0 && rgb.height() > 0 => Ok(rgb),
        _ => Err(PipelineError::InvalidImageShape {
            width: image.width(),
            height: image.height(),
            channels: color.channel_count(),
            bits: bits_per_channel(color),
        }),
    }
}

fn bits_per_channel(color: ColorType) -> u16 {
    color.bits_per_pixel() / color.channel_count().max(1) as u16
}

/// Remove haze from a decoded image.
///
/// Fails with [`PipelineError::InvalidImageShape`] unless the input is RGB8,
/// and with [`PipelineError::InvalidParameter`] for out-of-range settings.
pub fn dehaze(image: &DynamicImage, params: &DehazeParams) -> Result<RgbImage> {
    let rgb = require_rgb8(image)?;
    dehaze_rgb(rgb, params)
}

pub fn dehaze_rgb(image: &RgbImage, params: &DehazeParams) -> Result<RgbImage> {
    dehaze_with_maps(image, params).map(|(out, _)| out)
}

/// Like [`dehaze_rgb`], also returning the intermediate maps.
pub fn dehaze_with_maps(image: &RgbImage, params: &DehazeParams) -> Result<(RgbImage, DehazeMaps)> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PipelineError::InvalidImageShape {
            width: image.width(),
            height: image.height(),
            channels: 3,
            bits: 8,
        });
    }
    params.validate()?;

    let dark = dark_channel::dark_channel(image, params.patch_size);
    let light = atmospheric::estimate_atmospheric_light(image, &dark, params.top_fraction);
    debug!("atmospheric light: {:.1?}", light.0);

    let raw = transmission::estimate_transmission(&dark, &light, params.omega);
    let smoothed = blur::smooth(&raw, params.blur_size, params.blur_kind);
    let floored = transmission::floor_transmission(&smoothed, params.t_min);
    let recovered = radiance::recover_scene_radiance(image, &floored, &light, params.t_min);

    Ok((
        recovered,
        DehazeMaps {
            dark_channel: dark,
            atmospheric_light: light,
            transmission: floored,
        },
    ))
}
