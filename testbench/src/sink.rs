use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use polyphase::{Probe, Stream};

use crate::BenchError;

/// Consumer of the cascade's three observation streams.
pub trait ObservationSink {
    fn record(&mut self, tick: u64, probe: &Probe) -> Result<(), BenchError>;

    /// Called once after the last tick.
    fn finish(&mut self) -> Result<(), BenchError> {
        Ok(())
    }
}

/// One line per valid sample, `IN: <tick> <sample>` and so on.
pub struct TextLog<W: Write> {
    out: W,
    lines: usize,
}

impl TextLog<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, BenchError> {
        let f = File::create(path)?;
        Ok(Self::new(BufWriter::new(f)))
    }
}

impl<W: Write> TextLog<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ObservationSink for TextLog<W> {
    fn record(&mut self, tick: u64, probe: &Probe) -> Result<(), BenchError> {
        for (stream, sample) in probe.events() {
            writeln!(self.out, "{}: {} {}", stream.label(), tick, sample)?;
            self.lines += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), BenchError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Valid samples of every stream, kept in memory.
#[derive(Debug, Default, Clone)]
pub struct Capture {
    input: Vec<i16>,
    intermediate: Vec<i16>,
    output: Vec<i16>,
}

impl Capture {
    pub fn get(&self, stream: Stream) -> &[i16] {
        match stream {
            Stream::Input => &self.input,
            Stream::Intermediate => &self.intermediate,
            Stream::Output => &self.output,
        }
    }

    fn push(&mut self, stream: Stream, sample: i16) {
        match stream {
            Stream::Input => self.input.push(sample),
            Stream::Intermediate => self.intermediate.push(sample),
            Stream::Output => self.output.push(sample),
        }
    }
}

impl ObservationSink for Capture {
    fn record(&mut self, _tick: u64, probe: &Probe) -> Result<(), BenchError> {
        for (stream, sample) in probe.events() {
            self.push(stream, sample);
        }
        Ok(())
    }
}

/// Writes each stream to its own mono 16-bit WAV file when the run ends.
pub struct WavDump {
    prefix: PathBuf,
    rates: [u32; 3],
    capture: Capture,
}

impl WavDump {
    /// `rates` are the input, intermediate and output sample rates in Hz.
    pub fn new<P: Into<PathBuf>>(prefix: P, rates: [u32; 3]) -> Self {
        Self {
            prefix: prefix.into(),
            rates,
            capture: Capture::default(),
        }
    }

    pub fn path_for(&self, stream: Stream) -> PathBuf {
        let suffix = match stream {
            Stream::Input => "in",
            Stream::Intermediate => "mid",
            Stream::Output => "out",
        };
        let mut name = self.prefix.as_os_str().to_owned();
        name.push(format!("_{suffix}.wav"));
        PathBuf::from(name)
    }
}

impl ObservationSink for WavDump {
    fn record(&mut self, tick: u64, probe: &Probe) -> Result<(), BenchError> {
        self.capture.record(tick, probe)
    }

    fn finish(&mut self) -> Result<(), BenchError> {
        for (stream, rate) in Stream::ALL.into_iter().zip(self.rates) {
            let samples = self.capture.get(stream);
            if samples.is_empty() {
                continue;
            }
            let path = self.path_for(stream);
            let mut f = BufWriter::new(File::create(&path)?);
            write_wav(&mut f, rate, samples)?;
            f.flush()?;
            log::info!("wrote {} ({} samples)", path.display(), samples.len());
        }
        Ok(())
    }
}

/// Mono PCM WAV of 16-bit samples: a `fmt ` chunk and a `data` chunk inside
/// one `RIFF/WAVE` container.
pub fn write_wav<W: Write>(f: &mut W, sample_rate: u32, samples: &[i16]) -> std::io::Result<()> {
    const PCM: u16 = 1;
    const MONO: u16 = 1;
    const BITS: u16 = i16::BITS as u16;
    const BLOCK_ALIGN: u16 = MONO * BITS / 8;

    let mut fmt = Vec::with_capacity(16);
    for half in [PCM, MONO] {
        fmt.extend_from_slice(&half.to_le_bytes());
    }
    for word in [sample_rate, sample_rate * BLOCK_ALIGN as u32] {
        fmt.extend_from_slice(&word.to_le_bytes());
    }
    for half in [BLOCK_ALIGN, BITS] {
        fmt.extend_from_slice(&half.to_le_bytes());
    }

    // host byte order, little-endian on every supported target
    let data: &[u8] = bytemuck::cast_slice(samples);

    let riff_len = 4 + chunk_len(&fmt)? + chunk_len(data)?;
    f.write_all(b"RIFF")?;
    f.write_all(&riff_len.to_le_bytes())?;
    f.write_all(b"WAVE")?;
    write_chunk(f, b"fmt ", &fmt)?;
    write_chunk(f, b"data", data)
}

fn chunk_len(body: &[u8]) -> std::io::Result<u32> {
    u32::try_from(body.len() + 8).map_err(|_| std::io::Error::other("chunk too large for a WAV file"))
}

fn write_chunk<W: Write>(f: &mut W, id: &[u8; 4], body: &[u8]) -> std::io::Result<()> {
    let len = chunk_len(body)? - 8;
    f.write_all(id)?;
    f.write_all(&len.to_le_bytes())?;
    f.write_all(body)
}
