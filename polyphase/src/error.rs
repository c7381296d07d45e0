use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("stage configured with zero phases")]
    ZeroPhases,
    #[error("stage configured with zero taps per phase")]
    ZeroTaps,
    #[error("coefficient table has {actual} entries, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("coefficient {index} ({value}) does not fit in 16 bits")]
    CoefficientRange { index: usize, value: i32 },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TraceError {
    #[error("trace full")]
    Full,
}
