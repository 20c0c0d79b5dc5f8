use crate::annotate;
use crate::config::PipelineConfig;
use crate::dehaze;
use crate::detection::{DetectionAdapter, Detector};
use crate::error::{PipelineError, Result};
use crate::models::Detection;

use image::{DynamicImage, RgbImage};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to every stage
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Result of one `process_frame` call.
#[derive(Debug)]
pub struct ProcessedFrame {
    /// Dehazed image with detections burned in.
    pub image: RgbImage,
    pub detections: Vec<Detection>,
    /// Set when detection was attempted and failed; the frame was still annotated
    /// with zero detections.
    pub detection_error: Option<PipelineError>,
}

/// Dehaze, detect and annotate a single frame.
///
/// Holds only configuration and the detector; no state carries over between
/// calls, so the same instance can be driven once per still image or once per
/// video frame.
pub struct Pipeline {
    config: PipelineConfig,
    detector: Option<DetectionAdapter>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a pipeline without a detector
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            detector: None,
            context: PipelineContext::default(),
        }
    }

    pub fn with_detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detector = Some(DetectionAdapter::new(detector));
        self
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    /// Run Dehaze -> Detect -> Annotate on one decoded frame.
    ///
    /// A dehaze failure aborts the call. A detection failure is logged and the
    /// frame continues with no detections.
    pub fn process_frame(&self, raw: &DynamicImage) -> Result<ProcessedFrame> {
        self.process_frame_labeled(raw, "01")
    }

    /// Like [`Pipeline::process_frame`]; `label` names this frame's debug dumps.
    pub fn process_frame_labeled(&self, raw: &DynamicImage, label: &str) -> Result<ProcessedFrame> {
        let input = dehaze::require_rgb8(raw)?;
        self.save_debug(0, "input", label, input);

        let started = Instant::now();
        let dehazed = dehaze::dehaze_rgb(input, &self.config.dehaze)?;
        self.report_stage("Dehaze", started);
        self.save_debug(1, "dehaze", label, &dehazed);

        let started = Instant::now();
        let (detections, detection_error) = match &self.detector {
            Some(adapter) => match adapter.detect(&dehazed) {
                Ok(found) => (found, None),
                Err(err) => {
                    warn!("{err}; continuing without detections");
                    (Vec::new(), Some(err))
                }
            },
            None => (Vec::new(), None),
        };
        self.report_stage("Detect", started);

        let started = Instant::now();
        let annotated = annotate::annotate(dehazed, &detections, &self.config.annotation);
        self.report_stage("Annotate", started);
        self.save_debug(2, "annotate", label, &annotated);

        if self.context.verbose {
            info!("Frame {label}: {} detection(s)", detections.len());
        }

        Ok(ProcessedFrame {
            image: annotated,
            detections,
            detection_error,
        })
    }

    fn report_stage(&self, name: &str, started: Instant) {
        debug!("{name} took {:.2?}", started.elapsed());
    }

    /// Save a stage's image under `NN_<stage>/<label>.png` when debug mode is on.
    /// Debug output is best-effort and never fails the frame.
    fn save_debug(&self, index: usize, stage: &str, label: &str, image: &RgbImage) {
        let Some(debug_config) = &self.context.debug else {
            return;
        };
        let step_dir = debug_config.output_dir.join(format!("{index:02}_{stage}"));
        let output_path = step_dir.join(format!("{label}.png"));
        if let Err(e) = write_debug_image(&step_dir, &output_path, image) {
            warn!("Failed to save debug image {}: {e}", output_path.display());
        } else if self.context.verbose {
            debug!("Debug: saved {}", output_path.display());
        }
    }
}

fn write_debug_image(dir: &Path, path: &Path, image: &RgbImage) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    image.save(path)?;
    Ok(())
}
