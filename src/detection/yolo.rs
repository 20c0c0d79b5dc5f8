//! YOLOv8 detector backed by the `rten` inference runtime.
//!
//! Expects a model exported to ONNX and converted with `rten-convert`, taking
//! a `[1, 3, S, S]` RGB input in [0, 1] and producing `[1, 84, anchors]`.

use super::Detector;
use super::coco::COCO_CLASSES;
use super::postprocess::{Letterbox, OutputLayout, decode_yolov8, non_max_suppression};
use crate::config::DetectionSettings;
use crate::error::PipelineError;
use crate::models::RawCandidate;

use anyhow::anyhow;
use image::{Rgb, RgbImage, imageops};
use log::{debug, info};
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use std::path::Path;

/// Scores below this never leave the model wrapper.
const MIN_CANDIDATE_SCORE: f32 = 0.25;
/// Fill value for the letterbox border.
const PAD_VALUE: u8 = 114;

pub struct YoloDetector {
    model: Model,
    input_size: u32,
    nms_iou_threshold: f32,
}

impl YoloDetector {
    /// Load a `.rten` model. Out-of-range settings are `InvalidParameter`;
    /// a model that cannot be loaded is `DetectionUnavailable`.
    pub fn load(path: &Path, settings: &DetectionSettings) -> Result<Self, PipelineError> {
        settings.validate()?;
        info!("Loading detection model: {}", path.display());
        let model = Model::load_file(path).map_err(|e| {
            PipelineError::DetectionUnavailable(format!("failed to load {}: {e}", path.display()))
        })?;
        Ok(Self {
            model,
            input_size: settings.input_size,
            nms_iou_threshold: settings.nms_iou_threshold,
        })
    }

    /// Letterbox the frame and convert it to a normalized CHW tensor.
    fn prepare_input(&self, image: &RgbImage, letterbox: &Letterbox) -> NdTensor<f32, 4> {
        let size = self.input_size;
        let resized = imageops::resize(
            image,
            letterbox.scaled_width,
            letterbox.scaled_height,
            imageops::FilterType::Triangle,
        );
        let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));
        imageops::replace(
            &mut canvas,
            &resized,
            letterbox.pad_x as i64,
            letterbox.pad_y as i64,
        );

        let plane = (size * size) as usize;
        let mut data = vec![0.0f32; 3 * plane];
        for (x, y, pixel) in canvas.enumerate_pixels() {
            let offset = (y * size + x) as usize;
            for c in 0..3 {
                data[c * plane + offset] = pixel[c] as f32 / 255.0;
            }
        }
        NdTensor::from_data([1, 3, size as usize, size as usize], data)
    }
}

impl Detector for YoloDetector {
    fn infer(&self, image: &RgbImage) -> anyhow::Result<Vec<RawCandidate>> {
        let (width, height) = image.dimensions();
        let letterbox = Letterbox::fit(width, height, self.input_size);
        let input = self.prepare_input(image, &letterbox);

        let output = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| anyhow!("inference failed: {e}"))?;
        let output: NdTensor<f32, 3> = output
            .try_into()
            .map_err(|e| anyhow!("unexpected model output: {e:?}"))?;

        let [_, rows, anchors] = output.shape();
        let layout = OutputLayout { rows, anchors };
        let raw = output.to_vec();

        let candidates = decode_yolov8(&raw, layout, &letterbox, (width, height), MIN_CANDIDATE_SCORE);
        let decoded = candidates.len();
        let kept = non_max_suppression(candidates, self.nms_iou_threshold);
        debug!("yolo: {decoded} candidates, {} after NMS", kept.len());
        Ok(kept)
    }

    fn class_name(&self, class_index: usize) -> Option<&str> {
        COCO_CLASSES.get(class_index).copied()
    }
}
