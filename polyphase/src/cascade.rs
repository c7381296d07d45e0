use crate::coeffs::CoefficientTable;
use crate::stage::PolyphaseStage;
use crate::stream::{Beat, Probe};

/// Rational `L/M` resampler: an interpolating stage feeding a decimating one
/// on the same clock.
///
/// Whatever the upsampler drives in a tick is what the downsampler sees in
/// that same tick. There is no buffer in between, so a tick where the
/// upsampler has nothing valid is a tick where the downsampler does nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResamplerCascade<const L: usize, const TU: usize, const M: usize, const TD: usize> {
    upsampler: PolyphaseStage<L, TU>,
    downsampler: PolyphaseStage<M, TD>,
}

impl<const L: usize, const TU: usize, const M: usize, const TD: usize> ResamplerCascade<L, TU, M, TD> {
    pub fn new(up: CoefficientTable<L, TU>, down: CoefficientTable<M, TD>) -> Self {
        Self {
            upsampler: PolyphaseStage::interpolator(up),
            downsampler: PolyphaseStage::decimator(down),
        }
    }

    pub fn tick(&mut self, reset: bool, input: Beat) -> Probe {
        let intermediate = self.upsampler.tick(reset, input);
        let output = self.downsampler.tick(reset, intermediate);
        Probe {
            input,
            intermediate,
            output,
        }
    }

    pub fn reset(&mut self) {
        self.upsampler.reset();
        self.downsampler.reset();
    }

    pub fn ratio(&self) -> (usize, usize) {
        (L, M)
    }

    /// Fastest input cadence the upsampler admits without dropping samples.
    pub fn input_interval(&self) -> usize {
        2 * L - 1
    }

    pub fn upsampler(&self) -> &PolyphaseStage<L, TU> {
        &self.upsampler
    }

    pub fn downsampler(&self) -> &PolyphaseStage<M, TD> {
        &self.downsampler
    }
}
