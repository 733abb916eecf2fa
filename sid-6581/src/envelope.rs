//! ADSR envelope generator.
//!
//! Four phases: Attack, Decay, Sustain, Release. A rate counter sets the
//! speed of each phase; decay and release run through an exponential
//! sub-counter whose period widens as the level falls, approximating the
//! discharge curve of the original chip.

/// Attack rate periods (SID cycles per +1 of level).
const ATTACK_RATES: [u16; 16] = [
    9, 32, 63, 95, 149, 220, 267, 313, 392, 977, 1954, 3126, 3907, 11_720, 19_532, 31_251,
];

/// Decay/Release rate periods. Shared table; the exponential sub-counter
/// stretches the effective time.
const DECAY_RELEASE_RATES: [u16; 16] = [
    9, 32, 63, 95, 149, 220, 267, 313, 392, 977, 1954, 3126, 3907, 11_720, 19_532, 31_251,
];

/// Sustain levels: the 4-bit register value replicated into both nibbles.
const SUSTAIN_LEVELS: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE,
    0xFF,
];

/// Envelope phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Attack,
    Decay,
    Sustain,
    Release,
}

/// ADSR envelope generator for one voice.
pub struct Envelope {
    /// Current output level (0-255).
    pub level: u8,
    /// Current phase.
    pub phase: Phase,
    /// Rate counter, counts up to the phase's rate period.
    rate_counter: u16,
    /// Exponential sub-counter (decay/release only).
    exp_counter: u8,
    /// Exponential sub-counter period for the current level band.
    exp_period: u8,
    /// Attack register (0-15).
    pub attack: u8,
    /// Decay register (0-15).
    pub decay: u8,
    /// Sustain register (0-15).
    pub sustain: u8,
    /// Release register (0-15).
    pub release: u8,
    /// Previous gate state (edge detection).
    prev_gate: bool,
}

impl Envelope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: 0,
            phase: Phase::Release,
            rate_counter: 0,
            exp_counter: 0,
            exp_period: 1,
            attack: 0,
            decay: 0,
            sustain: 0,
            release: 0,
            prev_gate: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Clock the envelope one SID cycle.
    ///
    /// `gate` is the current gate bit of the voice control register.
    pub fn clock(&mut self, gate: bool) {
        if gate && !self.prev_gate {
            self.phase = Phase::Attack;
            self.rate_counter = 0;
            self.exp_counter = 0;
        } else if !gate && self.prev_gate {
            self.phase = Phase::Release;
        }
        self.prev_gate = gate;

        let rate_period = match self.phase {
            Phase::Attack => ATTACK_RATES[self.attack as usize],
            Phase::Decay => DECAY_RELEASE_RATES[self.decay as usize],
            Phase::Sustain => {
                // The level follows downward writes to the sustain nibble.
                let sustain_level = SUSTAIN_LEVELS[self.sustain as usize];
                if self.level > sustain_level {
                    self.level = sustain_level;
                }
                return;
            }
            Phase::Release => DECAY_RELEASE_RATES[self.release as usize],
        };

        self.rate_counter = self.rate_counter.wrapping_add(1);
        if self.rate_counter < rate_period {
            return;
        }
        self.rate_counter = 0;

        match self.phase {
            Phase::Attack => {
                self.level = self.level.saturating_add(1);
                if self.level == 0xFF {
                    self.phase = Phase::Decay;
                }
                self.update_exp_period();
            }
            Phase::Decay => {
                self.exp_counter = self.exp_counter.wrapping_add(1);
                if self.exp_counter < self.exp_period {
                    return;
                }
                self.exp_counter = 0;

                let sustain_level = SUSTAIN_LEVELS[self.sustain as usize];
                if self.level > sustain_level {
                    self.level -= 1;
                    self.update_exp_period();
                }
                if self.level <= sustain_level {
                    self.level = sustain_level;
                    self.phase = Phase::Sustain;
                }
            }
            Phase::Release => {
                self.exp_counter = self.exp_counter.wrapping_add(1);
                if self.exp_counter < self.exp_period {
                    return;
                }
                self.exp_counter = 0;

                if self.level > 0 {
                    self.level -= 1;
                    self.update_exp_period();
                }
            }
            Phase::Sustain => unreachable!(),
        }
    }

    /// Level bands for the exponential sub-counter period.
    fn update_exp_period(&mut self) {
        self.exp_period = if self.level >= 0x5D {
            1
        } else if self.level >= 0x36 {
            2
        } else if self.level >= 0x1A {
            4
        } else if self.level >= 0x0E {
            8
        } else if self.level >= 0x06 {
            16
        } else {
            30
        };
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
