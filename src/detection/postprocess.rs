//! Decoding of YOLOv8-style output tensors and non-maximum suppression.
//!
//! Kept free of any inference runtime so it can be exercised with synthetic
//! tensors.

use crate::models::{BoundingBox, RawCandidate};

/// Resize-and-pad transform from a frame into the square model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub scaled_width: u32,
    pub scaled_height: u32,
}

impl Letterbox {
    /// Fit a `width x height` frame inside a `target x target` square, centred.
    pub fn fit(width: u32, height: u32, target: u32) -> Self {
        let target = target.max(1);
        let scale = (target as f32 / width.max(1) as f32).min(target as f32 / height.max(1) as f32);
        let scaled_width = ((width as f32 * scale).round() as u32).clamp(1, target);
        let scaled_height = ((height as f32 * scale).round() as u32).clamp(1, target);
        Self {
            scale,
            pad_x: (target - scaled_width) as f32 / 2.0,
            pad_y: (target - scaled_height) as f32 / 2.0,
            scaled_width,
            scaled_height,
        }
    }

    /// Map a point from model-input space back to frame space.
    pub fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Shape of a `[1, 4 + classes, anchors]` output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLayout {
    pub rows: usize,
    pub anchors: usize,
}

impl OutputLayout {
    pub fn num_classes(&self) -> usize {
        self.rows.saturating_sub(4)
    }
}

/// Turn a flat YOLOv8 output into frame-space candidates.
///
/// Each anchor column holds `cx, cy, w, h` followed by one score per class;
/// the best class wins. Columns scoring below `min_score` are skipped and
/// boxes are clipped to the frame.
pub fn decode_yolov8(
    output: &[f32],
    layout: OutputLayout,
    letterbox: &Letterbox,
    frame: (u32, u32),
    min_score: f32,
) -> Vec<RawCandidate> {
    let OutputLayout { rows, anchors } = layout;
    if rows <= 4 || output.len() < rows * anchors {
        return Vec::new();
    }
    let max_x = frame.0.saturating_sub(1) as f32;
    let max_y = frame.1.saturating_sub(1) as f32;
    let at = |row: usize, anchor: usize| output[row * anchors + anchor];

    let mut candidates = Vec::new();
    for i in 0..anchors {
        let mut best_class = 0;
        let mut best_score = f32::MIN;
        for c in 0..layout.num_classes() {
            let score = at(4 + c, i);
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }
        if !(best_score >= min_score) {
            continue;
        }

        let (cx, cy, w, h) = (at(0, i), at(1, i), at(2, i), at(3, i));
        let (x1, y1) = letterbox.unmap(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.unmap(cx + w / 2.0, cy + h / 2.0);

        candidates.push(RawCandidate {
            bbox: BoundingBox::from_corners_f32(
                x1.clamp(0.0, max_x),
                y1.clamp(0.0, max_y),
                x2.clamp(0.0, max_x),
                y2.clamp(0.0, max_y),
            ),
            class_index: best_class,
            confidence: best_score,
        });
    }
    candidates
}

/// Intersection over union of two boxes; 0 when the union is empty.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let intersection = ((x2 - x1).max(0) as f32) * ((y2 - y1).max(0) as f32);
    let area_a = (a.width().max(0) as f32) * (a.height().max(0) as f32);
    let area_b = (b.width().max(0) as f32) * (b.height().max(0) as f32);
    let union = area_a + area_b - intersection;

    if union > 0.0 { intersection / union } else { 0.0 }
}

/// Per-class greedy NMS. Survivors come back sorted by descending confidence.
pub fn non_max_suppression(mut candidates: Vec<RawCandidate>, iou_threshold: f32) -> Vec<RawCandidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<RawCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = keep.iter().any(|kept| {
            kept.class_index == candidate.class_index && iou(&kept.bbox, &candidate.bbox) > iou_threshold
        });
        if !suppressed {
            keep.push(candidate);
        }
    }
    keep
}
