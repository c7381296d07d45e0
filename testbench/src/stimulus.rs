use std::f64::consts::PI;

use polyphase::Beat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub enum Waveform {
    /// `scale * (sin(a) + sin(b))`, so the peak is twice `scale`.
    TwoTone {
        sample_rate_hz: f64,
        tone_a_hz: f64,
        tone_b_hz: f64,
        scale: f64,
    },
    Constant(i16),
    /// One sample of the given height, then zeros.
    Impulse(i16),
    /// Uniform in `[-amplitude, amplitude]`, reproducible from `seed`.
    Noise { amplitude: i16, seed: u64 },
}

/// Round to nearest and saturate into 16 bits.
///
/// The filter stages never clamp, so this is the only place a stimulus value
/// gets forced into range.
pub fn quantize(value: f64, scale: f64) -> i16 {
    (value * scale)
        .round()
        .clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Paced source of input samples: one valid sample every `interval` ticks
/// until `count` have gone out.
pub struct Stimulus {
    waveform: Waveform,
    interval: usize,
    count: usize,
    produced: usize,
    tick: usize,
    rng: Option<StdRng>,
}

impl Stimulus {
    pub fn new(waveform: Waveform, interval: usize, count: usize) -> Self {
        let rng = match waveform {
            Waveform::Noise { seed, .. } => Some(StdRng::seed_from_u64(seed)),
            _ => None,
        };
        Self {
            waveform,
            interval: interval.max(1),
            count,
            produced: 0,
            tick: 0,
            rng,
        }
    }

    /// Called once per clock tick.
    pub fn poll(&mut self) -> Beat {
        let due = self.tick % self.interval == 0;
        self.tick += 1;

        if !due || self.is_exhausted() {
            return Beat::IDLE;
        }

        let sample = self.sample(self.produced);
        self.produced += 1;
        Beat::valid(sample)
    }

    pub fn produced(&self) -> usize {
        self.produced
    }

    pub fn is_exhausted(&self) -> bool {
        self.produced >= self.count
    }

    fn sample(&mut self, n: usize) -> i16 {
        match self.waveform {
            Waveform::TwoTone {
                sample_rate_hz,
                tone_a_hz,
                tone_b_hz,
                scale,
            } => {
                let t = n as f64 / sample_rate_hz;
                let v = (2.0 * PI * tone_a_hz * t).sin() + (2.0 * PI * tone_b_hz * t).sin();
                quantize(v, scale)
            }
            Waveform::Constant(x) => x,
            Waveform::Impulse(x) => {
                if n == 0 { x } else { 0 }
            }
            Waveform::Noise { amplitude, .. } => match self.rng.as_mut() {
                Some(rng) => rng.random_range(-amplitude..=amplitude),
                None => 0,
            },
        }
    }
}
