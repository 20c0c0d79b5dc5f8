pub mod coco;
pub mod postprocess;
#[cfg(feature = "yolo")]
pub mod yolo;

use crate::error::{PipelineError, Result};
use crate::models::{Detection, RawCandidate};
use image::RgbImage;
use log::debug;

/// Candidates at or below this score are dropped by [`DetectionAdapter`].
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// An object classification and localization capability.
///
/// Implementations report every candidate they find; filtering is the
/// adapter's job. A pre-trained model, a mock or any other detector can be
/// plugged in without touching the pipeline.
pub trait Detector {
    /// Run the detector on an RGB frame.
    fn infer(&self, image: &RgbImage) -> anyhow::Result<Vec<RawCandidate>>;

    /// Human-readable name for a class index reported by `infer`.
    fn class_name(&self, class_index: usize) -> Option<&str>;
}

/// Normalizes raw detector output into [`Detection`] records.
///
/// The confidence cut-off is always [`CONFIDENCE_THRESHOLD`].
pub struct DetectionAdapter {
    detector: Box<dyn Detector>,
}

impl DetectionAdapter {
    pub fn new(detector: Box<dyn Detector>) -> Self {
        Self { detector }
    }

    /// Detect objects in `image`, keeping only candidates scoring above
    /// [`CONFIDENCE_THRESHOLD`].
    ///
    /// Output order follows the detector's order. The image is never modified.
    pub fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>> {
        let candidates = self
            .detector
            .infer(image)
            .map_err(|e| PipelineError::DetectionUnavailable(format!("{e:#}")))?;
        let total = candidates.len();

        let detections: Vec<Detection> = candidates
            .into_iter()
            .filter(|c| c.confidence > CONFIDENCE_THRESHOLD)
            .map(|c| Detection {
                bbox: c.bbox,
                confidence: c.confidence,
                label: self.label_for(c.class_index),
            })
            .collect();

        debug!(
            "kept {} of {} candidates above {:.2}",
            detections.len(),
            total,
            CONFIDENCE_THRESHOLD
        );
        Ok(detections)
    }

    fn label_for(&self, class_index: usize) -> String {
        self.detector
            .class_name(class_index)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("class {class_index}"))
    }
}
