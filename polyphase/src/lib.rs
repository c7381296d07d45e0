//! Fixed-point rational resampling built from two polyphase FIR stages.
//!
//! An interpolating [`PolyphaseStage`] raises the rate by `L`, a decimating
//! one lowers it by `M`, and [`ResamplerCascade`] clocks the pair in lock-step
//! so a stream at `Fs` comes out at `Fs * L / M`. Everything is integer MAC
//! arithmetic on fixed-size state, advanced one clock tick at a time, so runs
//! are bit-exact and repeatable.

pub mod cascade;
pub mod coeffs;
pub mod error;
pub mod fixed;
pub mod stage;
pub mod stream;
pub mod trace;

pub use cascade::ResamplerCascade;
pub use coeffs::CoefficientTable;
pub use error::{ConfigError, TraceError};
pub use stage::{ControlState, Mode, PolyphaseStage};
pub use stream::{Beat, Probe, Stream};
pub use trace::{Trace, TraceRow};
