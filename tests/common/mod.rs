mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from desmog for tests
pub use desmog::{
    AnnotationStyle, BoundingBox, DehazeParams, Detection, DetectionAdapter, Detector,
    PipelineConfig, PipelineError, RawCandidate,
};
