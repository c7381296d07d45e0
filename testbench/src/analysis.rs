//! Spectral check of the captured streams.
//!
//! Every stream gets a Hamming-windowed FFT over its settled tail. Levels are
//! tone amplitudes in dB re one LSB, so streams of different lengths and rates
//! line up, and each stream is reported against the input's peak.

use std::ops::Range;

use polyphase::Stream;
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use crate::sink::Capture;
use crate::window::{window, HAMMING};

/// Bins either side of a tone's centre covered by the Hamming main lobe.
const LOBE_BINS: usize = 2;

/// Level reported for a bin with no energy at all.
pub const FLOOR_DB: f64 = -240.0;

/// One-sided magnitude spectrum of a real stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    sample_rate_hz: f64,
    bin_hz: f64,
    db: Vec<f64>,
}

impl Spectrum {
    pub fn of(samples: &[i16], sample_rate_hz: f64) -> Self {
        let len = samples.len();
        let bin_hz = sample_rate_hz / len.max(1) as f64;
        if len < 2 {
            return Self {
                sample_rate_hz,
                bin_hz,
                db: Vec::new(),
            };
        }

        let w = window(&HAMMING, len);
        let coherent_gain: f64 = w.iter().sum();
        let mut buf: Vec<Complex64> = samples
            .iter()
            .zip(&w)
            .map(|(&x, &c)| Complex64::new(x as f64 * c, 0.0))
            .collect();
        FftPlanner::<f64>::new().plan_fft_forward(len).process(&mut buf);

        let db = buf[..len / 2]
            .iter()
            .map(|c| {
                let amplitude = 2.0 * c.norm() / coherent_gain;
                (20.0 * amplitude.log10()).max(FLOOR_DB)
            })
            .collect();

        Self {
            sample_rate_hz,
            bin_hz,
            db,
        }
    }

    pub fn bin_hz(&self) -> f64 {
        self.bin_hz
    }

    pub fn levels_db(&self) -> &[f64] {
        &self.db
    }

    /// Strongest bin as `(freq_hz, level_db)`.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.db
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, &db)| (k as f64 * self.bin_hz, db))
    }

    /// Level of the tone at `freq_hz`, folded into this stream's band first.
    pub fn level_db(&self, freq_hz: f64) -> f64 {
        self.db[self.lobe(freq_hz)].iter().copied().fold(FLOOR_DB, f64::max)
    }

    /// Strongest bin outside the main lobe of `freq_hz`, as `(freq_hz, level_db)`.
    pub fn strongest_spur(&self, freq_hz: f64) -> Option<(f64, f64)> {
        let lobe = self.lobe(freq_hz);
        self.db
            .iter()
            .enumerate()
            .filter(|(k, _)| !lobe.contains(k))
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, &db)| (k as f64 * self.bin_hz, db))
    }

    fn lobe(&self, freq_hz: f64) -> Range<usize> {
        let centre = (alias_hz(freq_hz, self.sample_rate_hz) / self.bin_hz).round() as usize;
        let end = (centre + LOBE_BINS + 1).min(self.db.len());
        centre.saturating_sub(LOBE_BINS).min(end)..end
    }
}

/// Where `freq_hz` lands once sampled at `sample_rate_hz`, folded into
/// `[0, sample_rate_hz / 2]`.
pub fn alias_hz(freq_hz: f64, sample_rate_hz: f64) -> f64 {
    let f = freq_hz.abs() % sample_rate_hz;
    if f > sample_rate_hz / 2.0 {
        sample_rate_hz - f
    } else {
        f
    }
}

/// Drops the first eighth of a stream, where the filters are still filling.
pub fn settled(samples: &[i16]) -> &[i16] {
    &samples[samples.len() / 8..]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneReport {
    /// Kept tone relative to the input's peak.
    pub gain_db: f64,
    /// How far the rejected tone sits below the kept one.
    pub rejection_db: f64,
    /// How far the strongest bin outside the kept tone sits below it.
    pub spur_free_db: f64,
    pub spur_hz: f64,
}

impl ToneReport {
    pub fn measure(spectrum: &Spectrum, reference_db: f64, keep_hz: f64, reject_hz: f64) -> Self {
        let keep = spectrum.level_db(keep_hz);
        let (spur_hz, spur_db) = spectrum.strongest_spur(keep_hz).unwrap_or((0.0, FLOOR_DB));
        Self {
            gain_db: keep - reference_db,
            rejection_db: keep - spectrum.level_db(reject_hz),
            spur_free_db: keep - spur_db,
            spur_hz,
        }
    }

    /// Smaller of the two suppression figures.
    pub fn suppression_db(&self) -> f64 {
        self.rejection_db.min(self.spur_free_db)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralReport {
    /// Peak level of the input stream, the 0 dB reference for every gain.
    pub reference_db: f64,
    pub input: ToneReport,
    pub intermediate: ToneReport,
    pub output: ToneReport,
}

impl SpectralReport {
    /// `rates` are the input, intermediate and output sample rates in Hz.
    pub fn measure(capture: &Capture, rates: [f64; 3], keep_hz: f64, reject_hz: f64) -> Self {
        let [input, intermediate, output] =
            [0, 1, 2].map(|i| Spectrum::of(settled(capture.get(Stream::ALL[i])), rates[i]));
        let reference_db = input.peak().map_or(FLOOR_DB, |(_, db)| db);
        let report = |s: &Spectrum| ToneReport::measure(s, reference_db, keep_hz, reject_hz);

        Self {
            reference_db,
            input: report(&input),
            intermediate: report(&intermediate),
            output: report(&output),
        }
    }

    pub fn get(&self, stream: Stream) -> &ToneReport {
        match stream {
            Stream::Input => &self.input,
            Stream::Intermediate => &self.intermediate,
            Stream::Output => &self.output,
        }
    }

    /// Weakest suppression across the two resampled streams.
    pub fn worst_suppression_db(&self) -> f64 {
        self.intermediate.suppression_db().min(self.output.suppression_db())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::stimulus::quantize;

    fn tones(fs: f64, parts: &[(f64, f64)], len: usize) -> Vec<i16> {
        (0..len)
            .map(|n| {
                let t = n as f64 / fs;
                let v: f64 = parts.iter().map(|&(f, a)| a * (2.0 * PI * f * t).sin()).sum();
                quantize(v, 1.0)
            })
            .collect()
    }

    #[test]
    fn folds_frequencies_into_first_nyquist_zone() {
        assert_eq!(alias_hz(4.0e6, 6.0e6), 2.0e6);
        assert_eq!(alias_hz(1.0e6, 6.0e6), 1.0e6);
        assert_eq!(alias_hz(8.0e6, 6.0e6), 2.0e6);
        assert_eq!(alias_hz(4.0e6, 18.0e6), 4.0e6);
    }

    #[test]
    fn levels_read_as_tone_amplitude() {
        let s = Spectrum::of(&tones(6.0e6, &[(1.0e6, 10_000.0)], 1200), 6.0e6);
        assert_eq!(s.bin_hz(), 5000.0);
        assert_eq!(s.levels_db().len(), 600);

        // 20 log10(10000)
        assert!((s.level_db(1.0e6) - 80.0).abs() < 0.05);
        let (hz, db) = s.peak().unwrap();
        assert_eq!(hz, 1.0e6);
        assert_eq!(db, s.level_db(1.0e6));
    }

    #[test]
    fn measures_relative_tone_levels() {
        // second tone 40 dB down
        let s = Spectrum::of(&tones(6.0e6, &[(1.0e6, 20_000.0), (2.0e6, 200.0)], 1200), 6.0e6);
        let r = s.level_db(1.0e6) - s.level_db(2.0e6);
        assert!((r - 40.0).abs() < 0.5, "rejection {r}");
    }

    #[test]
    fn finds_spurs_away_from_the_checked_tones() {
        let s = Spectrum::of(&tones(6.0e6, &[(1.0e6, 20_000.0), (2.5e6, 200.0)], 1200), 6.0e6);
        let reference = s.peak().unwrap().1;
        let report = ToneReport::measure(&s, reference, 1.0e6, 2.0e6);

        assert_eq!(report.gain_db, 0.0);
        assert!(report.rejection_db > 60.0, "rejection {}", report.rejection_db);
        assert_eq!(report.spur_hz, 2.5e6);
        assert!((report.spur_free_db - 40.0).abs() < 0.5, "spur {}", report.spur_free_db);
        assert_eq!(report.suppression_db(), report.spur_free_db);
    }

    #[test]
    fn gain_is_taken_against_the_reference() {
        let full = Spectrum::of(&tones(6.0e6, &[(1.0e6, 10_000.0)], 1200), 6.0e6);
        let half = Spectrum::of(&tones(6.0e6, &[(1.0e6, 5_000.0)], 1200), 6.0e6);
        let reference = full.peak().unwrap().1;

        let report = ToneReport::measure(&half, reference, 1.0e6, 2.0e6);
        assert!((report.gain_db + 6.02).abs() < 0.05, "gain {}", report.gain_db);
    }

    #[test]
    fn empty_stream_has_no_peak() {
        let s = Spectrum::of(&[], 6.0e6);
        assert_eq!(s.peak(), None);
        assert_eq!(s.level_db(1.0e6), FLOOR_DB);
        assert_eq!(s.strongest_spur(1.0e6), None);
    }
}
