use super::FloatMap;
use crate::config::BlurKind;
use imageproc::filter::separable_filter_equal;

/// Smooth a float map with a `size x size` kernel.
///
/// Even sizes are widened to the next odd size so the kernel stays centred.
/// Borders replicate the edge values.
pub fn smooth(map: &FloatMap, size: u32, kind: BlurKind) -> FloatMap {
    let radius = (size / 2) as usize;
    if radius == 0 || map.width() == 0 || map.height() == 0 {
        return map.clone();
    }
    match kind {
        BlurKind::Gaussian => {
            let kernel = gaussian_kernel(radius, sigma_for_size(2 * radius + 1));
            separable_filter_equal(map, &kernel)
        }
        BlurKind::Box => separable_filter_equal(map, &box_kernel(radius)),
    }
}

/// Sigma used for a Gaussian of the given kernel width when none is supplied:
/// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn sigma_for_size(size: usize) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

fn gaussian_kernel(radius: usize, sigma: f32) -> Vec<f32> {
    let two_sigma_sq = 2.0 * sigma * sigma;
    let weights: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-(d * d) / two_sigma_sq).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

fn box_kernel(radius: usize) -> Vec<f32> {
    let side = 2 * radius + 1;
    vec![1.0 / side as f32; side]
}
