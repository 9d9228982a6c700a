use thiserror::Error;

/// Failure modes of the pitch-shift pipeline.
///
/// Parameter and input problems are rejected before any processing starts.
/// Detection and mark-placement failures abort the whole call, so no partial
/// output is ever returned; for multi-channel input a failure on any channel
/// fails the entire call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PsolaError {
    #[error("pitch ratio must be a positive finite number, got {0}")]
    InvalidRatio(f32),

    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("input signal has no channels or no samples")]
    EmptyInput,

    #[error("channel lengths differ: expected {expected} samples, got {actual}")]
    ChannelLengthMismatch { expected: usize, actual: usize },

    #[error("periodicity estimation produced no usable estimates")]
    DetectionFailed,

    #[error("no pitch marks could be placed on the signal")]
    MarkPlacementFailed,

    #[error("grain telemetry requires a single-channel signal, got {0} channels")]
    TelemetryRequiresMono(usize),
}
