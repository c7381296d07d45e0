//! Polyphase FIR stage, clocked one tick at a time.
//!
//! A stage holds `TAPS` rows of `PHASES` accumulator cells. Every time the
//! stage computes, each row multiplies its latched sample by its latched
//! coefficient, adds the oldest cell of the row above it and pushes the sum
//! into its own top cell while the rest of the row shifts down by one. The
//! oldest cell of row 0 is the filter output, `PHASES` computations behind.
//!
//! All reads during a tick see the registers as they were when the tick
//! started; the next register set is built on the side and swapped in at the
//! end, so the order of the assignments inside `tick` never matters.

use log::{debug, trace};

use crate::coeffs::CoefficientTable;
use crate::fixed::{chain, mac, rescale, Acc, Coeff, Sample};
use crate::stream::Beat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Upsample by `PHASES`: one admitted input yields `PHASES` outputs.
    Interpolate,
    /// Downsample by `PHASES`: `PHASES` inputs yield one output.
    ///
    /// Within the revolution an output sums, the newest input meets phase 1,
    /// the next older phase 2 and so on, and the oldest meets phase 0.
    Decimate,
}

/// Pulse/gap cadence of an interpolating stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Gap,
    Pulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registers<const PHASES: usize, const TAPS: usize> {
    phase: usize,
    control: ControlState,
    input_latch: [Sample; TAPS],
    coeff_latch: [Coeff; TAPS],
    pipeline: [[Acc; PHASES]; TAPS],
    accumulator: Acc,
    output: Beat,
}

impl<const PHASES: usize, const TAPS: usize> Registers<PHASES, TAPS> {
    const CLEAR: Self = Self {
        phase: 0,
        control: ControlState::Idle,
        input_latch: [0; TAPS],
        coeff_latch: [0; TAPS],
        pipeline: [[0; PHASES]; TAPS],
        accumulator: 0,
        output: Beat::IDLE,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyphaseStage<const PHASES: usize, const TAPS: usize> {
    mode: Mode,
    gain_bits: u32,
    table: CoefficientTable<PHASES, TAPS>,
    regs: Registers<PHASES, TAPS>,
}

impl<const PHASES: usize, const TAPS: usize> PolyphaseStage<PHASES, TAPS> {
    pub fn new(mode: Mode, table: CoefficientTable<PHASES, TAPS>) -> Self {
        Self {
            mode,
            gain_bits: table.gain_bits(),
            table,
            regs: Registers::CLEAR,
        }
    }

    pub fn interpolator(table: CoefficientTable<PHASES, TAPS>) -> Self {
        Self::new(Mode::Interpolate, table)
    }

    pub fn decimator(table: CoefficientTable<PHASES, TAPS>) -> Self {
        Self::new(Mode::Decimate, table)
    }

    pub fn reset(&mut self) {
        debug!(
            "{:?} stage reset (phase {}, {:?})",
            self.mode, self.regs.phase, self.regs.control
        );
        self.regs = Registers::CLEAR;
    }

    /// Advance one clock tick.
    ///
    /// `reset` wins over everything else and leaves the output invalid. On
    /// ticks without a computation the output is invalid and keeps the last
    /// emitted sample.
    pub fn tick(&mut self, reset: bool, input: Beat) -> Beat {
        if reset {
            self.reset();
            return self.regs.output;
        }

        let cur = self.regs;
        let next = match self.mode {
            Mode::Interpolate => self.interpolate(&cur, input),
            Mode::Decimate => self.decimate(&cur, input),
        };
        self.regs = next;

        if next.output.valid {
            trace!(
                "{:?} phase {} -> {}",
                self.mode,
                cur.phase,
                next.output.sample
            );
        }
        next.output
    }

    fn interpolate(&self, cur: &Registers<PHASES, TAPS>, input: Beat) -> Registers<PHASES, TAPS> {
        let mut next = *cur;
        next.output.valid = false;

        match cur.control {
            ControlState::Idle => {
                let Some(x) = input.get() else {
                    return next;
                };
                self.compute(cur, &mut next, 0, Some(x));
                next.output = Beat::valid(rescale(cur.pipeline[0][0], self.gain_bits));

                if PHASES > 1 {
                    next.phase = 1;
                    next.control = ControlState::Gap;
                }
            }
            ControlState::Gap => {
                next.control = ControlState::Pulse;
            }
            ControlState::Pulse => {
                let phase = cur.phase;
                self.compute(cur, &mut next, phase, None);
                next.output = Beat::valid(rescale(cur.pipeline[0][0], self.gain_bits));

                if phase == PHASES - 1 {
                    next.phase = 0;
                    next.control = ControlState::Idle;
                } else {
                    next.phase = phase + 1;
                    next.control = ControlState::Gap;
                }
            }
        }

        next
    }

    fn decimate(&self, cur: &Registers<PHASES, TAPS>, input: Beat) -> Registers<PHASES, TAPS> {
        let mut next = *cur;
        next.output.valid = false;

        let Some(x) = input.get() else {
            return next;
        };

        // the counter as it stood when the tick began, not the decremented one
        let phase = cur.phase;
        self.compute(cur, &mut next, phase, Some(x));

        let partial = cur.pipeline[0][0];
        if phase == 0 {
            let total = chain(partial, cur.accumulator);
            next.output = Beat::valid(rescale(total, self.gain_bits));
            next.accumulator = 0;
        } else {
            next.accumulator = chain(partial, cur.accumulator);
        }

        next.phase = if phase == 0 { PHASES - 1 } else { phase - 1 };
        next
    }

    /// One MAC step across every tap row for `phase`. `latch` carries the
    /// sample to capture into the input latches, if this step captures one.
    fn compute(
        &self,
        cur: &Registers<PHASES, TAPS>,
        next: &mut Registers<PHASES, TAPS>,
        phase: usize,
        latch: Option<Sample>,
    ) {
        for t in 0..TAPS {
            next.coeff_latch[t] = self.table.get(t, phase);
            if let Some(x) = latch {
                next.input_latch[t] = x;
            }

            let product = mac(cur.input_latch[t], cur.coeff_latch[t]);
            let carry = if t + 1 < TAPS { cur.pipeline[t + 1][0] } else { 0 };

            let row = &mut next.pipeline[t];
            row[..PHASES - 1].copy_from_slice(&cur.pipeline[t][1..]);
            row[PHASES - 1] = chain(product, carry);
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn table(&self) -> &CoefficientTable<PHASES, TAPS> {
        &self.table
    }

    pub fn phase(&self) -> usize {
        self.regs.phase
    }

    pub fn control(&self) -> ControlState {
        self.regs.control
    }

    /// Partial revolution sum of a decimating stage.
    pub fn accumulator(&self) -> Acc {
        self.regs.accumulator
    }

    pub fn pipeline_cell(&self, tap: usize, slot: usize) -> Acc {
        self.regs.pipeline[tap][slot]
    }

    /// Last sample driven on the output, valid or not.
    pub fn output(&self) -> Beat {
        self.regs.output
    }

    /// True when every register holds its reset value.
    pub fn is_cleared(&self) -> bool {
        self.regs == Registers::CLEAR
    }
}
