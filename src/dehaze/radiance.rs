use super::FloatMap;
use super::atmospheric::AtmosphericLight;
use image::{Rgb, RgbImage};

/// Invert the haze model: `J = (I - A) / clamp(t, t_min, 1) + A`.
///
/// The result is clamped to [0, 255] and rounded to the nearest integer.
pub fn recover_scene_radiance(
    img: &RgbImage,
    transmission: &FloatMap,
    light: &AtmosphericLight,
    t_min: f32,
) -> RgbImage {
    let (width, height) = img.dimensions();
    let floor = t_min.clamp(f32::MIN_POSITIVE, 1.0);
    RgbImage::from_fn(width, height, |x, y| {
        let raw = transmission.get_pixel(x, y)[0];
        let t = if raw.is_finite() { raw.clamp(floor, 1.0) } else { 1.0 };
        let pixel = img.get_pixel(x, y);
        let mut out = [0u8; 3];
        for c in 0..3 {
            let a = light.0[c];
            let recovered = (pixel[c] as f32 - a) / t + a;
            out[c] = to_channel(recovered);
        }
        Rgb(out)
    })
}

fn to_channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round() as u8
}
