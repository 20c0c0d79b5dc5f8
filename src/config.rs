//! Tunable parameters for every pipeline stage.
//!
//! All structs deserialize with `#[serde(default)]`, so a settings file only
//! needs to name the values it overrides.

use crate::dehaze::dark_channel::MAX_PATCH_SIZE;
use crate::error::PipelineError;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Smoothing filter applied to the raw transmission map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlurKind {
    /// Gaussian kernel with sigma derived from the kernel size.
    #[default]
    Gaussian,
    /// Unweighted mean over the kernel window.
    Box,
}

/// Dark-channel-prior dehazing parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DehazeParams {
    /// Side of the square erosion window used for the dark channel.
    pub patch_size: u32,
    /// Fraction of haze removed; values near 1 remove almost all of it.
    pub omega: f32,
    /// Fraction of the brightest dark-channel pixels averaged into the airlight.
    pub top_fraction: f32,
    /// Lower bound on transmission before it is used as a divisor.
    pub t_min: f32,
    /// Side of the smoothing kernel applied to the transmission map.
    pub blur_size: u32,
    pub blur_kind: BlurKind,
}

impl Default for DehazeParams {
    fn default() -> Self {
        Self {
            patch_size: 15,
            omega: 0.95,
            top_fraction: 0.1,
            t_min: 0.1,
            blur_size: 15,
            blur_kind: BlurKind::Gaussian,
        }
    }
}

impl DehazeParams {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.patch_size == 0 || self.patch_size > MAX_PATCH_SIZE {
            return Err(invalid(
                "patch_size",
                format!("{} is outside 1..={MAX_PATCH_SIZE}", self.patch_size),
            ));
        }
        if self.blur_size == 0 {
            return Err(invalid("blur_size", "must be at least 1"));
        }
        if !(self.omega > 0.0 && self.omega <= 1.0) {
            return Err(invalid("omega", format!("{} is outside (0, 1]", self.omega)));
        }
        if !(self.top_fraction > 0.0 && self.top_fraction <= 1.0) {
            return Err(invalid(
                "top_fraction",
                format!("{} is outside (0, 1]", self.top_fraction),
            ));
        }
        if !(self.t_min > 0.0 && self.t_min <= 1.0) {
            return Err(invalid("t_min", format!("{} is outside (0, 1]", self.t_min)));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> PipelineError {
    PipelineError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// Detector post-processing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionSettings {
    /// IoU above which overlapping candidates of the same class are suppressed.
    pub nms_iou_threshold: f32,
    /// Square model input resolution in pixels.
    pub input_size: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            nms_iou_threshold: 0.45,
            input_size: 640,
        }
    }
}

impl DetectionSettings {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.input_size == 0 {
            return Err(invalid("input_size", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.nms_iou_threshold) {
            return Err(invalid(
                "nms_iou_threshold",
                format!("{} is outside [0, 1]", self.nms_iou_threshold),
            ));
        }
        Ok(())
    }
}

/// Fixed drawing style for boxes and labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnnotationStyle {
    /// RGB color used for both the rectangle and the label text.
    pub color: [u8; 3],
    /// Rectangle stroke width in pixels.
    pub thickness: u32,
    /// Integer magnification of the built-in 5x7 font.
    pub font_scale: u32,
    /// Distance in pixels between the label baseline and the top edge of the box.
    pub label_offset: u32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            color: [0, 255, 0],
            thickness: 2,
            font_scale: 1,
            label_offset: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    /// JPEG quality (1-100) used when the output path has a JPEG extension.
    pub jpeg_quality: u8,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

/// Complete configuration for one pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub dehaze: DehazeParams,
    pub detection: DetectionSettings,
    pub annotation: AnnotationStyle,
    pub output: OutputSettings,
}

impl PipelineConfig {
    /// Load settings from a JSON file; missing fields keep their defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config JSON at {}", path.display()))?;
        config
            .dehaze
            .validate()
            .with_context(|| format!("invalid dehaze settings in {}", path.display()))?;
        config
            .detection
            .validate()
            .with_context(|| format!("invalid detection settings in {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize config JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(())
    }
}
