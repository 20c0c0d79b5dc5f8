use super::FloatMap;
use super::atmospheric::AtmosphericLight;
use image::{GrayImage, Luma};

/// Raw transmission `1 - omega * dark / max(A)`.
///
/// A black airlight (`max(A) == 0`) means there is no haze to remove, so the
/// map is all ones instead of dividing by zero.
pub fn estimate_transmission(dark: &GrayImage, light: &AtmosphericLight, omega: f32) -> FloatMap {
    let (width, height) = dark.dimensions();
    let airlight = light.max();
    if airlight <= 0.0 {
        return FloatMap::from_pixel(width, height, Luma([1.0]));
    }
    FloatMap::from_fn(width, height, |x, y| {
        let d = dark.get_pixel(x, y)[0] as f32;
        Luma([1.0 - omega * (d / airlight)])
    })
}

/// Clamp every transmission value into `[t_min, 1]`; non-finite values become 1.
pub fn floor_transmission(map: &FloatMap, t_min: f32) -> FloatMap {
    let floor = t_min.clamp(f32::MIN_POSITIVE, 1.0);
    FloatMap::from_fn(map.width(), map.height(), |x, y| {
        let t = map.get_pixel(x, y)[0];
        Luma([if t.is_finite() { t.clamp(floor, 1.0) } else { 1.0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_lifts_values_below_t_min() {
        let mut map = FloatMap::from_pixel(3, 1, Luma([0.5]));
        map.put_pixel(0, 0, Luma([-0.2]));
        map.put_pixel(2, 0, Luma([f32::NAN]));
        let floored = floor_transmission(&map, 0.1);
        let row: Vec<f32> = floored.pixels().map(|p| p[0]).collect();
        assert_eq!(row, vec![0.1, 0.5, 1.0]);
    }
}
