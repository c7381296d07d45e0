//! Compile-time run configuration loaded via `static-toml`.

use std::path::PathBuf;

use crate::stimulus::Waveform;
use crate::BenchError;

static_toml::static_toml! {
    static RESAMPLER = include_toml!("resampler.toml");
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub waveform: Waveform,
    pub sample_rate_hz: f64,
    pub samples: usize,
    pub reset_ticks: usize,
    pub flush_ticks: usize,
    pub log_path: PathBuf,
    pub wav_prefix: Option<PathBuf>,
    /// Tones checked by the spectral pass, when the stimulus has two.
    pub tones: Option<(f64, f64)>,
    pub min_rejection_db: f64,
}

impl BenchConfig {
    pub fn load() -> Result<Self, BenchError> {
        let s = &RESAMPLER.stimulus;

        let waveform = waveform_from(
            s.kind,
            s.sample_rate_hz,
            (s.tone_a_hz, s.tone_b_hz),
            s.scale,
            s.amplitude,
            s.seed,
        )?;

        let out = &RESAMPLER.output;
        let config = Self {
            tones: matches!(waveform, Waveform::TwoTone { .. }).then_some((s.tone_a_hz, s.tone_b_hz)),
            waveform,
            sample_rate_hz: s.sample_rate_hz,
            samples: count("stimulus.samples", s.samples)?,
            reset_ticks: count("run.reset_ticks", RESAMPLER.run.reset_ticks)?,
            flush_ticks: count("run.flush_ticks", RESAMPLER.run.flush_ticks)?,
            log_path: PathBuf::from(out.log_path),
            wav_prefix: out.wav.then(|| PathBuf::from(out.wav_prefix)),
            min_rejection_db: RESAMPLER.analysis.min_rejection_db,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.sample_rate_hz.is_nan() || self.sample_rate_hz <= 0.0 {
            return Err(BenchError::Config(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if self.samples == 0 {
            return Err(BenchError::Config("stimulus.samples must be at least 1".into()));
        }
        if let Some((a, b)) = self.tones {
            let nyquist = self.sample_rate_hz / 2.0;
            if a <= 0.0 || b <= 0.0 || a >= nyquist || b >= nyquist {
                return Err(BenchError::Config(format!(
                    "tones {a} Hz / {b} Hz must lie inside (0, {nyquist}) Hz"
                )));
            }
        }
        Ok(())
    }
}

pub fn waveform_from(
    kind: &str,
    sample_rate_hz: f64,
    tones: (f64, f64),
    scale: f64,
    amplitude: i64,
    seed: i64,
) -> Result<Waveform, BenchError> {
    let amplitude = i16::try_from(amplitude)
        .map_err(|_| BenchError::Config(format!("amplitude {amplitude} does not fit in 16 bits")))?;

    match kind {
        "two_tone" => Ok(Waveform::TwoTone {
            sample_rate_hz,
            tone_a_hz: tones.0,
            tone_b_hz: tones.1,
            scale,
        }),
        "constant" => Ok(Waveform::Constant(amplitude)),
        "impulse" => Ok(Waveform::Impulse(amplitude)),
        "noise" => Ok(Waveform::Noise {
            amplitude,
            seed: u64::try_from(seed)
                .map_err(|_| BenchError::Config(format!("stimulus.seed must not be negative, got {seed}")))?,
        }),
        other => Err(BenchError::Config(format!("unknown stimulus kind {other:?}"))),
    }
}

fn count(key: &str, value: i64) -> Result<usize, BenchError> {
    usize::try_from(value).map_err(|_| BenchError::Config(format!("{key} must not be negative, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_settings_describe_the_two_tone_run() {
        let config = BenchConfig::load().unwrap();
        assert_eq!(config.sample_rate_hz, 9.0e6);
        assert_eq!(config.tones, Some((1.0e6, 4.0e6)));
        assert!(matches!(config.waveform, Waveform::TwoTone { scale, .. } if scale == 15000.0));
        assert!(config.samples > 0);
    }

    #[test]
    fn rejects_unknown_kind_and_wide_amplitude() {
        assert!(matches!(
            waveform_from("square", 1.0, (0.1, 0.2), 1.0, 0, 0),
            Err(BenchError::Config(_))
        ));
        assert!(matches!(
            waveform_from("constant", 1.0, (0.1, 0.2), 1.0, 40_000, 0),
            Err(BenchError::Config(_))
        ));
        assert_eq!(
            waveform_from("impulse", 1.0, (0.1, 0.2), 1.0, -5, 0).unwrap(),
            Waveform::Impulse(-5)
        );
    }

    #[test]
    fn noise_seed_must_not_be_negative() {
        assert!(matches!(
            waveform_from("noise", 1.0, (0.1, 0.2), 1.0, 100, -1),
            Err(BenchError::Config(msg)) if msg.contains("seed")
        ));
        assert_eq!(
            waveform_from("noise", 1.0, (0.1, 0.2), 1.0, 100, 7).unwrap(),
            Waveform::Noise { amplitude: 100, seed: 7 }
        );
    }

    #[test]
    fn rejects_tones_above_nyquist() {
        let mut config = BenchConfig::load().unwrap();
        config.tones = Some((1.0e6, 5.0e6));
        assert!(config.validate().is_err());
    }
}
