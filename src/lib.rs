pub mod annotate;
pub mod config;
pub mod dehaze;
pub mod detection;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;

pub use annotate::annotate;
pub use config::{AnnotationStyle, BlurKind, DehazeParams, DetectionSettings, OutputSettings, PipelineConfig};
pub use dehaze::{AtmosphericLight, DehazeMaps, dehaze};
pub use detection::{CONFIDENCE_THRESHOLD, DetectionAdapter, Detector};
pub use error::PipelineError;
pub use models::{BoundingBox, Detection, RawCandidate};
pub use pipeline::{DebugConfig, Pipeline, PipelineContext, ProcessedFrame};

#[cfg(feature = "yolo")]
pub use detection::yolo::YoloDetector;
