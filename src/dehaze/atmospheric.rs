use image::{GrayImage, RgbImage};
use std::cmp::Ordering;

/// Estimated airlight color, one value per channel on the 0-255 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphericLight(pub [f32; 3]);

impl AtmosphericLight {
    /// Brightest channel; the normaliser for the transmission estimate.
    pub fn max(&self) -> f32 {
        self.0.iter().copied().fold(0.0, f32::max)
    }
}

/// Average the image colors under the brightest `top_fraction` of the dark channel.
///
/// Candidates are ordered by dark-channel value (descending). Ties are broken
/// by the summed RGB intensity of the original pixel (descending) and then by
/// raster index (ascending), so the estimate is fully reproducible and favours
/// the haziest-looking pixel when the dark channel cannot tell them apart.
/// At least one pixel is always used.
pub fn estimate_atmospheric_light(
    img: &RgbImage,
    dark: &GrayImage,
    top_fraction: f32,
) -> AtmosphericLight {
    let width = dark.width() as usize;
    let total = dark.as_raw().len();
    if total == 0 {
        return AtmosphericLight([0.0; 3]);
    }
    let count = ((top_fraction * total as f32) as usize).clamp(1, total);

    let intensity = |idx: usize| -> u16 {
        let p = img.get_pixel((idx % width) as u32, (idx / width) as u32);
        p.0.iter().map(|&c| c as u16).sum()
    };
    let dark_raw = dark.as_raw();
    let rank = |a: &usize, b: &usize| -> Ordering {
        dark_raw[*b]
            .cmp(&dark_raw[*a])
            .then_with(|| intensity(*b).cmp(&intensity(*a)))
            .then_with(|| a.cmp(b))
    };

    let mut indices: Vec<usize> = (0..total).collect();
    if count < total {
        indices.select_nth_unstable_by(count - 1, rank);
        indices.truncate(count);
    }

    let mut sum = [0.0f64; 3];
    for idx in &indices {
        let p = img.get_pixel((idx % width) as u32, (idx / width) as u32);
        for c in 0..3 {
            sum[c] += p[c] as f64;
        }
    }
    let n = indices.len() as f64;
    AtmosphericLight([
        (sum[0] / n) as f32,
        (sum[1] / n) as f32,
        (sum[2] / n) as f32,
    ])
}
