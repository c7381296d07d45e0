//! Fixed-capacity tick-by-tick record of the two filtered streams, for
//! comparing a run against a stored golden trace.

use heapless::Vec;

use crate::error::TraceError;
use crate::stream::{Beat, Probe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRow {
    pub tick: u32,
    pub intermediate: Beat,
    pub output: Beat,
}

impl From<TraceRow> for TraceError {
    fn from(_: TraceRow) -> Self {
        TraceError::Full
    }
}

#[derive(Debug, Default)]
pub struct Trace<const N: usize> {
    rows: Vec<TraceRow, N>,
}

impl<const N: usize> Trace<N> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn record(&mut self, tick: u32, probe: &Probe) -> Result<(), TraceError> {
        self.rows.push(TraceRow {
            tick,
            intermediate: probe.intermediate,
            output: probe.output,
        })?;
        Ok(())
    }

    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Index of the first row that differs from `golden`, or the length of
    /// the shorter of the two when one is a prefix of the other.
    pub fn first_divergence(&self, golden: &[TraceRow]) -> Option<usize> {
        if let Some(i) = self.rows.iter().zip(golden).position(|(a, b)| a != b) {
            return Some(i);
        }
        if self.rows.len() != golden.len() {
            return Some(self.rows.len().min(golden.len()));
        }
        None
    }

    pub fn matches(&self, golden: &[TraceRow]) -> bool {
        self.first_divergence(golden).is_none()
    }
}
