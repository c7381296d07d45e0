use crate::error::ConfigError;
use crate::fixed::{fits_coeff, gain_bits, Coeff};

/// Read-only tap weights of one stage, addressed by `(tap, phase)`.
///
/// The flat form used by coefficient sources is `tap * PHASES + phase`, which
/// is also the natural order of the prototype filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoefficientTable<const PHASES: usize, const TAPS: usize> {
    taps: [[Coeff; PHASES]; TAPS],
}

impl<const PHASES: usize, const TAPS: usize> CoefficientTable<PHASES, TAPS> {
    pub const TOTAL_TAPS: usize = PHASES * TAPS;

    pub fn from_slice(coeffs: &[Coeff]) -> Result<Self, ConfigError> {
        Self::check_shape(coeffs.len())?;

        let mut taps = [[0; PHASES]; TAPS];
        for (i, &c) in coeffs.iter().enumerate() {
            taps[i / PHASES][i % PHASES] = c;
        }
        Ok(Self { taps })
    }

    /// Like [`from_slice`](Self::from_slice) for sources that hand out wider
    /// integers; every value still has to fit the coefficient width.
    pub fn from_words(words: &[i32]) -> Result<Self, ConfigError> {
        Self::check_shape(words.len())?;

        let mut taps = [[0; PHASES]; TAPS];
        for (i, &w) in words.iter().enumerate() {
            if !fits_coeff(w) {
                return Err(ConfigError::CoefficientRange { index: i, value: w });
            }
            taps[i / PHASES][i % PHASES] = w as Coeff;
        }
        Ok(Self { taps })
    }

    fn check_shape(len: usize) -> Result<(), ConfigError> {
        if PHASES == 0 {
            return Err(ConfigError::ZeroPhases);
        }
        if TAPS == 0 {
            return Err(ConfigError::ZeroTaps);
        }
        if len != Self::TOTAL_TAPS {
            return Err(ConfigError::LengthMismatch {
                expected: Self::TOTAL_TAPS,
                actual: len,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, tap: usize, phase: usize) -> Coeff {
        self.taps[tap][phase]
    }

    pub fn phases(&self) -> usize {
        PHASES
    }

    pub fn taps_per_phase(&self) -> usize {
        TAPS
    }

    pub fn len(&self) -> usize {
        Self::TOTAL_TAPS
    }

    pub fn is_empty(&self) -> bool {
        Self::TOTAL_TAPS == 0
    }

    pub fn gain_bits(&self) -> u32 {
        gain_bits(PHASES)
    }

    /// Sum of the sub-filter for one phase (its DC gain before scaling).
    pub fn phase_sum(&self, phase: usize) -> i32 {
        self.taps.iter().map(|row| row[phase] as i32).sum()
    }

    pub fn dc_sum(&self) -> i32 {
        (0..PHASES).map(|p| self.phase_sum(p)).sum()
    }
}
