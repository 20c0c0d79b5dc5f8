use desmog::{Detector, RawCandidate};
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use std::cell::Cell;

/// Uniform RGB image.
pub fn solid_image(width: u32, height: u32, value: u8) -> RgbImage {
    ImageBuffer::from_pixel(width, height, Rgb([value, value, value]))
}

/// 4x4 image with a bright (200) top-left quadrant and dark (20) elsewhere.
pub fn quadrant_image() -> RgbImage {
    ImageBuffer::from_fn(4, 4, |x, y| {
        if x < 2 && y < 2 {
            Rgb([200u8, 200, 200])
        } else {
            Rgb([20u8, 20, 20])
        }
    })
}

/// Deterministic colorful pattern with hazy (bright, low-saturation) and dark regions.
pub fn pattern_image(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let r = ((x * 37 + y * 11) % 256) as u8;
        let g = ((x * 5 + y * 53) % 256) as u8;
        let b = if (x / 3 + y / 3) % 2 == 0 { 230 } else { 15 };
        Rgb([r, g, b])
    })
}

pub fn as_dynamic(image: RgbImage) -> DynamicImage {
    DynamicImage::ImageRgb8(image)
}

pub fn candidate(x1: i32, y1: i32, x2: i32, y2: i32, class_index: usize, confidence: f32) -> RawCandidate {
    RawCandidate {
        bbox: desmog::BoundingBox::new(x1, y1, x2, y2),
        class_index,
        confidence,
    }
}

/// Detector returning a fixed candidate list and counting its invocations.
pub struct MockDetector {
    pub candidates: Vec<RawCandidate>,
    pub names: Vec<String>,
    pub calls: Cell<usize>,
}

impl MockDetector {
    pub fn new(candidates: Vec<RawCandidate>) -> Self {
        Self {
            candidates,
            names: vec!["person".to_string(), "car".to_string()],
            calls: Cell::new(0),
        }
    }
}

impl Detector for MockDetector {
    fn infer(&self, _image: &RgbImage) -> anyhow::Result<Vec<RawCandidate>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.candidates.clone())
    }

    fn class_name(&self, class_index: usize) -> Option<&str> {
        self.names.get(class_index).map(String::as_str)
    }
}

/// Detector whose capability cannot be invoked.
pub struct FailingDetector;

impl Detector for FailingDetector {
    fn infer(&self, _image: &RgbImage) -> anyhow::Result<Vec<RawCandidate>> {
        anyhow::bail!("model session not initialised")
    }

    fn class_name(&self, _class_index: usize) -> Option<&str> {
        None
    }
}

/// `pattern_image` blended 60% toward a light gray veil, as haze would.
pub fn hazy_image(width: u32, height: u32) -> RgbImage {
    let base = pattern_image(width, height);
    ImageBuffer::from_fn(width, height, |x, y| {
        let p = base.get_pixel(x, y);
        let veil = |c: u8| (0.4 * c as f32 + 0.6 * 200.0).round() as u8;
        Rgb([veil(p[0]), veil(p[1]), veil(p[2])])
    })
}
