include!(concat!(env!("OUT_DIR"), "/coeffs.rs"));

use polyphase::{CoefficientTable, ConfigError, ResamplerCascade};

pub type Cascade = ResamplerCascade<UPSAMPLE, UP_TAPS_PER_PHASE, DOWNSAMPLE, DOWN_TAPS_PER_PHASE>;

pub fn build_cascade() -> Result<Cascade, ConfigError> {
    let up = CoefficientTable::from_slice(&UP_COEFFS)?;
    let down = CoefficientTable::from_slice(&DOWN_COEFFS)?;
    Ok(ResamplerCascade::new(up, down))
}
