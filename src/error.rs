use thiserror::Error;

/// Failure kinds surfaced by the core. Presentation is left to the caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input was not a non-empty 3-channel 8-bit grid.
    #[error("invalid image shape: {width}x{height} with {channels} channel(s) of {bits} bits")]
    InvalidImageShape {
        width: u32,
        height: u32,
        channels: u8,
        bits: u16,
    },

    /// The detection capability could not be initialised or invoked.
    #[error("detection unavailable: {0}")]
    DetectionUnavailable(String),

    /// The annotated image could not be encoded or written.
    #[error("failed to encode output: {0}")]
    EncodeFailure(String),

    /// Configuration values outside their recognised ranges.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
