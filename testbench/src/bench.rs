use log::{debug, info};
use polyphase::{Beat, Probe, Stream};

use crate::coeffs::Cascade;
use crate::sink::ObservationSink;
use crate::stimulus::Stimulus;
use crate::BenchError;

/// Valid samples seen on each stream during a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamCounts {
    pub input: usize,
    pub intermediate: usize,
    pub output: usize,
}

impl StreamCounts {
    fn add(&mut self, probe: &Probe) {
        for (stream, _) in probe.events() {
            match stream {
                Stream::Input => self.input += 1,
                Stream::Intermediate => self.intermediate += 1,
                Stream::Output => self.output += 1,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub counts: StreamCounts,
}

/// Clocks a cascade from a stimulus: a few reset ticks, the stimulus until it
/// runs dry, then enough idle ticks to drain the last burst.
pub struct Testbench {
    cascade: Cascade,
    stimulus: Stimulus,
    reset_ticks: usize,
    flush_ticks: usize,
    tick: u64,
    counts: StreamCounts,
}

impl Testbench {
    pub fn new(cascade: Cascade, stimulus: Stimulus, reset_ticks: usize, flush_ticks: usize) -> Self {
        Self {
            cascade,
            stimulus,
            reset_ticks,
            flush_ticks,
            tick: 0,
            counts: StreamCounts::default(),
        }
    }

    pub fn run(&mut self, sinks: &mut [&mut dyn ObservationSink]) -> Result<RunStats, BenchError> {
        debug!("holding reset for {} ticks", self.reset_ticks);
        for _ in 0..self.reset_ticks {
            self.step(true, Beat::IDLE, sinks)?;
        }

        while !self.stimulus.is_exhausted() {
            let input = self.stimulus.poll();
            self.step(false, input, sinks)?;
        }
        info!("stimulus done after {} samples", self.stimulus.produced());

        for _ in 0..self.flush_ticks {
            self.step(false, Beat::IDLE, sinks)?;
        }

        for sink in sinks.iter_mut() {
            sink.finish()?;
        }

        Ok(RunStats {
            ticks: self.tick,
            counts: self.counts,
        })
    }

    fn step(
        &mut self,
        reset: bool,
        input: Beat,
        sinks: &mut [&mut dyn ObservationSink],
    ) -> Result<(), BenchError> {
        let probe = self.cascade.tick(reset, input);
        self.counts.add(&probe);
        for sink in sinks.iter_mut() {
            sink.record(self.tick, &probe)?;
        }
        self.tick += 1;
        Ok(())
    }

    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }
}
