//! Cycle-level testbench for the `polyphase` resampler: drives a generated
//! 2/3 cascade from a configured stimulus, logs every valid sample and checks
//! how well the cascade suppresses the out-of-band tone.

use log::{info, warn};
use polyphase::{ConfigError, Stream};
use thiserror::Error;

pub mod analysis;
pub mod bench;
pub mod coeffs;
pub mod settings;
pub mod sink;
pub mod stimulus;
pub mod window;

use crate::analysis::SpectralReport;
use crate::bench::{StreamCounts, Testbench};
use crate::settings::BenchConfig;
use crate::sink::{Capture, ObservationSink, TextLog, WavDump};
use crate::stimulus::Stimulus;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("config error: {0}")]
    Config(String),
    #[error("coefficient error: {0}")]
    Coefficients(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("out-of-band energy only {measured_db:.1} dB down, need {required_db:.1} dB")]
    Rejection { measured_db: f64, required_db: f64 },
}

/// Outcome of one testbench run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub ticks: u64,
    pub counts: StreamCounts,
    /// Per-stream levels against the input's peak, when the stimulus was a
    /// two-tone.
    pub spectrum: Option<SpectralReport>,
}

pub fn run() -> Result<RunReport, BenchError> {
    let config = BenchConfig::load()?;
    run_with(&config)
}

pub fn run_with(config: &BenchConfig) -> Result<RunReport, BenchError> {
    config.validate()?;

    let cascade = coeffs::build_cascade()?;
    let (l, m) = cascade.ratio();
    info!(
        "resampling {} Hz by {l}/{m}, one input every {} ticks",
        config.sample_rate_hz,
        cascade.input_interval()
    );

    let stimulus = Stimulus::new(config.waveform.clone(), cascade.input_interval(), config.samples);

    let in_hz = config.sample_rate_hz;
    let mid_hz = in_hz * l as f64;
    let out_hz = mid_hz / m as f64;

    let mut capture = Capture::default();
    let mut log = TextLog::create(&config.log_path)?;
    let mut wav = config
        .wav_prefix
        .as_ref()
        .map(|prefix| WavDump::new(prefix, [in_hz as u32, mid_hz as u32, out_hz as u32]));

    let mut bench = Testbench::new(cascade, stimulus, config.reset_ticks, config.flush_ticks);
    let stats = {
        let mut sinks: Vec<&mut dyn ObservationSink> = vec![&mut capture, &mut log];
        if let Some(wav) = wav.as_mut() {
            sinks.push(wav);
        }
        bench.run(&mut sinks)?
    };

    info!(
        "{} ticks: {} in, {} mid, {} out, log at {}",
        stats.ticks,
        stats.counts.input,
        stats.counts.intermediate,
        stats.counts.output,
        config.log_path.display()
    );

    let spectrum = match config.tones {
        Some((keep, reject)) => {
            let report = SpectralReport::measure(&capture, [in_hz, mid_hz, out_hz], keep, reject);
            for stream in Stream::ALL {
                let r = report.get(stream);
                info!(
                    "{}: {keep} Hz at {:+.2} dB, {reject} Hz {:.1} dB down, worst spur {:.1} dB down at {} Hz",
                    stream.label(),
                    r.gain_db,
                    r.rejection_db,
                    r.spur_free_db,
                    r.spur_hz
                );
            }

            let worst = report.worst_suppression_db();
            if worst < config.min_rejection_db {
                warn!("suppression below {} dB", config.min_rejection_db);
                return Err(BenchError::Rejection {
                    measured_db: worst,
                    required_db: config.min_rejection_db,
                });
            }
            Some(report)
        }
        None => None,
    };

    Ok(RunReport {
        ticks: stats.ticks,
        counts: stats.counts,
        spectrum,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::stimulus::Waveform;

    fn config(name: &str, waveform: Waveform, samples: usize) -> BenchConfig {
        let tones = match waveform {
            Waveform::TwoTone { tone_a_hz, tone_b_hz, .. } => Some((tone_a_hz, tone_b_hz)),
            _ => None,
        };
        BenchConfig {
            waveform,
            sample_rate_hz: 9.0e6,
            samples,
            reset_ticks: 4,
            flush_ticks: 16,
            log_path: std::env::temp_dir().join(format!("resampler-{}-{name}.txt", std::process::id())),
            wav_prefix: None,
            tones,
            min_rejection_db: 40.0,
        }
    }

    fn two_tone() -> Waveform {
        Waveform::TwoTone {
            sample_rate_hz: 9.0e6,
            tone_a_hz: 1.0e6,
            tone_b_hz: 4.0e6,
            scale: 15000.0,
        }
    }

    #[test]
    fn two_tone_run_suppresses_the_upper_tone() {
        let config = config("two-tone", two_tone(), 1800);
        let report = run_with(&config).unwrap();
        fs::remove_file(&config.log_path).ok();

        assert_eq!(report.counts.input, 1800);
        assert_eq!(report.counts.intermediate, 3600);
        assert_eq!(report.counts.output, 1200);

        let spectrum = report.spectrum.unwrap();
        for stream in [Stream::Intermediate, Stream::Output] {
            let r = spectrum.get(stream);
            assert!(r.rejection_db >= 40.0, "{stream:?} rejection {:.1} dB", r.rejection_db);
            assert!(r.spur_free_db >= 40.0, "{stream:?} spur at {} Hz", r.spur_hz);
        }
        assert!(spectrum.worst_suppression_db() >= 40.0);
    }

    #[test]
    fn passband_tone_keeps_its_input_level() {
        let config = config("gain", two_tone(), 1800);
        let spectrum = run_with(&config).unwrap().spectrum.unwrap();
        fs::remove_file(&config.log_path).ok();

        // both input tones have the same amplitude, so either can be the peak
        assert!((spectrum.reference_db - 20.0 * 15_000f64.log10()).abs() < 0.1);
        for stream in Stream::ALL {
            let gain = spectrum.get(stream).gain_db;
            assert!(gain.abs() < 0.5, "{stream:?} gain {gain:.2} dB");
        }
    }

    #[test]
    fn text_log_lists_every_valid_sample() {
        let config = config("impulse", Waveform::Impulse(4096), 12);
        let report = run_with(&config).unwrap();
        let text = fs::read_to_string(&config.log_path).unwrap();
        fs::remove_file(&config.log_path).ok();

        assert!(report.spectrum.is_none());
        let lines: Vec<&str> = text.lines().collect();
        let events = report.counts.input + report.counts.intermediate + report.counts.output;
        assert_eq!(lines.len(), events);

        // first input lands right after the reset ticks
        assert_eq!(lines[0], "IN: 4 4096");
        for line in &lines {
            let (label, rest) = line.split_once(": ").unwrap();
            assert!(["IN", "MID", "OUT"].contains(&label));
            let mut fields = rest.split(' ');
            fields.next().unwrap().parse::<u64>().unwrap();
            fields.next().unwrap().parse::<i16>().unwrap();
            assert!(fields.next().is_none());
        }
    }

    #[test]
    fn bad_config_is_rejected_before_running() {
        let mut config = config("bad", Waveform::Constant(1), 10);
        config.samples = 0;
        assert!(matches!(run_with(&config), Err(BenchError::Config(_))));
    }

    #[test]
    fn wav_files_are_written_per_stream() {
        let mut config = config("wav", Waveform::Constant(1000), 30);
        let prefix = std::env::temp_dir().join(format!("resampler-{}-wav", std::process::id()));
        config.wav_prefix = Some(prefix.clone());
        run_with(&config).unwrap();
        fs::remove_file(&config.log_path).ok();

        let dump = WavDump::new(prefix, [0; 3]);
        for stream in Stream::ALL {
            let path: PathBuf = dump.path_for(stream);
            let bytes = fs::read(&path).unwrap();
            fs::remove_file(&path).ok();
            assert_eq!(&bytes[..4], b"RIFF");
        }
    }
}
