//! State-variable multi-mode filter.
//!
//! Two-integrator-loop SVF running at the output sample rate. The mode
//! register selects which of the low-pass, band-pass and high-pass taps
//! sum into the output; cutoff and resonance come from the register file.

#![allow(clippy::cast_precision_loss)]

use std::f32::consts::TAU;

// Mode bits (from the mode/volume register)
pub const MODE_LP: u8 = 0x10;
pub const MODE_BP: u8 = 0x20;
pub const MODE_HP: u8 = 0x40;

/// State-variable filter.
pub struct Filter {
    /// Low-pass integrator state.
    lp: f32,
    /// Band-pass integrator state.
    bp: f32,

    /// 11-bit cutoff register.
    pub cutoff: u16,
    /// 4-bit resonance register.
    pub resonance: u8,
    /// Mode bits (LP/BP/HP).
    pub mode: u8,
    /// Voice routing bits 0-2.
    pub routing: u8,

    /// Output sample rate the filter runs at.
    sample_rate: u32,
}

impl Filter {
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            lp: 0.0,
            bp: 0.0,
            cutoff: 0,
            resonance: 0,
            mode: 0,
            routing: 0,
            sample_rate,
        }
    }

    pub fn reset(&mut self) {
        self.lp = 0.0;
        self.bp = 0.0;
        self.cutoff = 0;
        self.resonance = 0;
        self.mode = 0;
        self.routing = 0;
    }

    /// Process one sample through the filter and return the sum of the
    /// selected mode outputs.
    pub fn clock(&mut self, input: f32) -> f32 {
        let w0 = self.cutoff_coefficient();
        let q = 1.0 / (1.0 - f32::from(self.resonance) / 17.0);

        let hp = input - self.lp - self.bp / q;
        self.bp += w0 * hp;
        self.lp += w0 * self.bp;

        let mut output = 0.0;
        if self.mode & MODE_LP != 0 {
            output += self.lp;
        }
        if self.mode & MODE_BP != 0 {
            output += self.bp;
        }
        if self.mode & MODE_HP != 0 {
            output += hp;
        }
        output
    }

    /// Map the 11-bit cutoff register to the integrator coefficient.
    ///
    /// Linear approximation of the chip's curve: ~30 Hz floor, ~12 kHz at
    /// full scale. The coefficient is clamped below 0.9 to keep the SVF
    /// stable at high cutoffs.
    fn cutoff_coefficient(&self) -> f32 {
        let fc_hz = 30.0 + f32::from(self.cutoff) * 5.8;
        (TAU * fc_hz / self.sample_rate as f32).min(0.9)
    }

    /// Returns true if voice `n` (0-2) routes through the filter.
    #[must_use]
    pub fn voice_routed(&self, voice: usize) -> bool {
        self.routing & (1 << voice) != 0
    }
}
