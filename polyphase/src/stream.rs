use crate::fixed::Sample;

/// One tick of a valid-gated stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Beat {
    pub valid: bool,
    pub sample: Sample,
}

impl Beat {
    pub const IDLE: Beat = Beat { valid: false, sample: 0 };

    pub const fn valid(sample: Sample) -> Self {
        Self { valid: true, sample }
    }

    /// The sample, if this tick carries one.
    pub fn get(&self) -> Option<Sample> {
        self.valid.then_some(self.sample)
    }
}

/// The three observation points of a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Input,
    Intermediate,
    Output,
}

impl Stream {
    pub const ALL: [Stream; 3] = [Stream::Input, Stream::Intermediate, Stream::Output];

    /// Short tag used by text logs.
    pub fn label(&self) -> &'static str {
        match self {
            Stream::Input => "IN",
            Stream::Intermediate => "MID",
            Stream::Output => "OUT",
        }
    }
}

/// Everything visible on the cascade's streams during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Probe {
    pub input: Beat,
    pub intermediate: Beat,
    pub output: Beat,
}

impl Probe {
    pub fn get(&self, stream: Stream) -> Beat {
        match stream {
            Stream::Input => self.input,
            Stream::Intermediate => self.intermediate,
            Stream::Output => self.output,
        }
    }

    /// Valid events this tick, in stream order.
    pub fn events(&self) -> impl Iterator<Item = (Stream, Sample)> + '_ {
        Stream::ALL
            .into_iter()
            .filter_map(move |s| self.get(s).get().map(|x| (s, x)))
    }
}
