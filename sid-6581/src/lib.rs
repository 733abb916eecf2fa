//! 6581-style sound synthesizer card.
//!
//! Three voices, each a 24-bit phase-accumulator oscillator with four
//! waveforms and an ADSR envelope, mixed through a state-variable filter.
//! The chip clock is 985,248 Hz; one `tick()` call processes a macro-tick
//! of 128 chip cycles and the output is downsampled to the configured
//! sample rate.
//!
//! # Register map (29 registers)
//!
//! | Addr | Register          |
//! |------|-------------------|
//! | $00  | Voice 1 freq lo   |
//! | $01  | Voice 1 freq hi   |
//! | $02  | Voice 1 PW lo     |
//! | $03  | Voice 1 PW hi     |
//! | $04  | Voice 1 control   |
//! | $05  | Voice 1 AD        |
//! | $06  | Voice 1 SR        |
//! | $07-$0D | Voice 2 (same layout) |
//! | $0E-$14 | Voice 3 (same layout) |
//! | $15  | Filter cutoff lo  |
//! | $16  | Filter cutoff hi  |
//! | $17  | Filter routing + resonance |
//! | $18  | Volume + filter mode |
//! | $19  | Paddle X (reads 0) |
//! | $1A  | Paddle Y (reads 0) |
//! | $1B  | OSC3 output (read-only) |
//! | $1C  | ENV3 output (read-only) |

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

mod envelope;
mod filter;
mod voice;

pub use envelope::{Envelope, Phase};
pub use filter::Filter;
pub use voice::Voice;

/// Chip clock in Hz.
pub const SID_CLOCK: u32 = 985_248;

/// Chip cycles processed per `tick()` call.
pub const CYCLES_PER_TICK: u32 = 128;

/// 6581-style synthesizer.
pub struct Sid6581 {
    /// Three voices.
    pub voices: [Voice; 3],
    /// One envelope generator per voice.
    pub envelopes: [Envelope; 3],
    /// Shared multi-mode filter.
    pub filter: Filter,
    /// 4-bit master volume.
    pub volume: u8,
    /// Voice 3 mute (bit 7 of the mode/volume register). The oscillator
    /// and envelope keep running for use as a modulation source.
    pub voice3_off: bool,

    /// Output sample rate in Hz.
    sample_rate: u32,
    /// Sample pacing accumulator: gains `sample_rate` per chip cycle and
    /// emits one sample each time it reaches `SID_CLOCK`.
    sample_counter: u32,
    /// Output buffer, drained by the machine after each macro-tick.
    samples: Vec<f32>,
}

impl Sid6581 {
    /// Create a synthesizer producing mono samples at `sample_rate` Hz.
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            voices: [Voice::new(), Voice::new(), Voice::new()],
            envelopes: [Envelope::new(), Envelope::new(), Envelope::new()],
            filter: Filter::new(sample_rate),
            volume: 0,
            voice3_off: false,
            sample_rate,
            sample_counter: 0,
            samples: Vec::with_capacity(sample_rate as usize / 50 + 1),
        }
    }

    /// Reset all voices, envelopes and the filter.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
        for env in &mut self.envelopes {
            env.reset();
        }
        self.filter.reset();
        self.volume = 0;
        self.voice3_off = false;
        self.sample_counter = 0;
        self.samples.clear();
    }

    /// Read a register. Only OSC3 ($1B) and ENV3 ($1C) are readable;
    /// everything else returns 0.
    #[must_use]
    pub fn read(&self, addr: u8) -> u8 {
        match addr & 0x1F {
            0x1B => {
                let ring_msb = self.voices[1].msb();
                (self.voices[2].waveform_output(ring_msb) >> 4) as u8
            }
            0x1C => self.envelopes[2].level,
            _ => 0,
        }
    }

    /// Write a register. Out-of-range values are masked; writes to the
    /// read-only registers are ignored.
    pub fn write(&mut self, addr: u8, value: u8) {
        let reg = addr & 0x1F;
        match reg {
            0x00..=0x14 => {
                let voice = (reg / 7) as usize;
                let field = reg % 7;
                self.write_voice(voice, field, value);
            }
            0x15 => {
                self.filter.cutoff = (self.filter.cutoff & 0x7F8) | u16::from(value & 0x07);
            }
            0x16 => {
                self.filter.cutoff = (self.filter.cutoff & 0x007) | (u16::from(value) << 3);
            }
            0x17 => {
                self.filter.resonance = (value >> 4) & 0x0F;
                self.filter.routing = value & 0x07;
            }
            0x18 => {
                self.volume = value & 0x0F;
                self.filter.mode = value & 0x70;
                self.voice3_off = value & 0x80 != 0;
            }
            _ => {}
        }
    }

    fn write_voice(&mut self, voice: usize, field: u8, value: u8) {
        match field {
            0 => {
                self.voices[voice].frequency =
                    (self.voices[voice].frequency & 0xFF00) | u16::from(value);
            }
            1 => {
                self.voices[voice].frequency =
                    (self.voices[voice].frequency & 0x00FF) | (u16::from(value) << 8);
            }
            2 => {
                self.voices[voice].pulse_width =
                    (self.voices[voice].pulse_width & 0x0F00) | u16::from(value);
            }
            3 => {
                self.voices[voice].pulse_width = (self.voices[voice].pulse_width & 0x00FF)
                    | ((u16::from(value) & 0x0F) << 8);
            }
            4 => self.voices[voice].control = value,
            5 => {
                self.envelopes[voice].attack = (value >> 4) & 0x0F;
                self.envelopes[voice].decay = value & 0x0F;
            }
            6 => {
                self.envelopes[voice].sustain = (value >> 4) & 0x0F;
                self.envelopes[voice].release = value & 0x0F;
            }
            _ => unreachable!(),
        }
    }

    /// Process one macro-tick (128 chip cycles).
    ///
    /// Oscillators, sync, ring modulation and envelopes advance every chip
    /// cycle; a sample is produced whenever the pacing accumulator crosses
    /// the chip clock.
    pub fn tick(&mut self) {
        for _ in 0..CYCLES_PER_TICK {
            self.clock_cycle();
        }
    }

    fn clock_cycle(&mut self) {
        // Capture MSBs for sync edge detection
        let prev_msb = [
            self.voices[0].msb(),
            self.voices[1].msb(),
            self.voices[2].msb(),
        ];

        for voice in &mut self.voices {
            voice.clock_accumulator();
        }
        for voice in &mut self.voices {
            voice.clock_noise();
        }

        // Hard sync: each voice's source is the previous voice (2->0, 0->1, 1->2)
        if self.voices[0].control & voice::CTRL_SYNC != 0 {
            self.voices[0].apply_sync(prev_msb[2], self.voices[2].msb());
        }
        if self.voices[1].control & voice::CTRL_SYNC != 0 {
            self.voices[1].apply_sync(prev_msb[0], self.voices[0].msb());
        }
        if self.voices[2].control & voice::CTRL_SYNC != 0 {
            self.voices[2].apply_sync(prev_msb[1], self.voices[1].msb());
        }

        for i in 0..3 {
            let gate = self.voices[i].gate();
            self.envelopes[i].clock(gate);
        }

        // Sample pacing: accumulate the output rate against the chip clock
        self.sample_counter += self.sample_rate;
        if self.sample_counter >= SID_CLOCK {
            self.sample_counter -= SID_CLOCK;
            let sample = self.mix();
            self.samples.push(sample);
        }
    }

    /// Mix the three voices through the filter and master volume.
    fn mix(&mut self) -> f32 {
        // Ring-mod sources: 2->0, 0->1, 1->2
        let ring_msb = [
            self.voices[2].msb(),
            self.voices[0].msb(),
            self.voices[1].msb(),
        ];

        let mut filtered_sum = 0.0f32;
        let mut direct_sum = 0.0f32;

        for i in 0..3 {
            let routed = self.filter.voice_routed(i);
            if i == 2 && self.voice3_off && !routed {
                continue;
            }

            let waveform = self.voices[i].waveform_output(ring_msb[i]);
            let centred = f32::from(waveform as i16 - 0x800);
            let amplitude = centred * f32::from(self.envelopes[i].level) / 256.0;

            if routed {
                filtered_sum += amplitude;
            } else {
                direct_sum += amplitude;
            }
        }

        let filter_output = self.filter.clock(filtered_sum);
        let mixed = (filter_output + direct_sum) * f32::from(self.volume) / 15.0 / 4096.0;
        mixed.clamp(-1.0, 1.0)
    }

    /// Drain the output buffer.
    pub fn take_samples(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }

    /// Number of buffered samples.
    #[must_use]
    pub fn buffered_samples(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_when_idle() {
        let mut sid = Sid6581::new(44_100);
        for _ in 0..200 {
            sid.tick();
        }
        let buf = sid.take_samples();
        assert!(!buf.is_empty(), "Samples flow even in silence");
        assert!(buf.iter().all(|s| s.abs() < 1e-6));
    }

    #[test]
    fn sample_rate_paces_output() {
        let mut sid = Sid6581::new(44_100);
        let ticks = SID_CLOCK / CYCLES_PER_TICK;
        for _ in 0..ticks {
            sid.tick();
        }
        let cycles = u64::from(ticks) * u64::from(CYCLES_PER_TICK);
        let expected = (cycles * 44_100 / u64::from(SID_CLOCK)) as i64;
        let produced = sid.buffered_samples() as i64;
        assert!(
            (produced - expected).abs() <= 1,
            "Chip time maps to sample time: got {produced}, expected ~{expected}"
        );
    }

    #[test]
    fn sawtooth_swings_both_ways() {
        let mut sid = Sid6581::new(44_100);
        // Voice 1: sawtooth ~440 Hz, instant attack, full sustain
        let freq: u16 = 7493;
        sid.write(0x00, (freq & 0xFF) as u8);
        sid.write(0x01, (freq >> 8) as u8);
        sid.write(0x05, 0x00);
        sid.write(0x06, 0xF0);
        sid.write(0x04, 0x21); // sawtooth + gate
        sid.write(0x18, 0x0F); // volume 15

        for _ in 0..2000 {
            sid.tick();
        }

        let buf = sid.take_samples();
        assert!(buf.iter().any(|&s| s > 0.01));
        assert!(buf.iter().any(|&s| s < -0.01));
        assert!(buf.iter().all(|&s| (-1.0..=1.0).contains(&s)));
    }

    #[test]
    fn envelope_rises_then_falls_after_gate_off() {
        let mut sid = Sid6581::new(44_100);
        sid.write(0x00, 0x00);
        sid.write(0x01, 0x10); // frequency $1000
        sid.write(0x05, 0x00); // AD
        sid.write(0x06, 0xF0); // SR
        sid.write(0x04, 0x21); // sawtooth + gate

        for _ in 0..20 {
            sid.tick();
        }
        let peak = sid.envelopes[0].level;
        assert!(peak > 0, "Envelope rises after 20 macro-ticks");

        sid.write(0x04, 0x20); // gate off
        let mut last = sid.envelopes[0].level;
        for _ in 0..20 {
            sid.tick();
            let level = sid.envelopes[0].level;
            if last > 0 {
                assert!(level < last, "Release strictly decreases ({level} < {last})");
            }
            last = level;
        }
    }

    #[test]
    fn osc3_readback_tracks_oscillator() {
        let mut sid = Sid6581::new(44_100);
        sid.write(0x0E, 0xFF);
        sid.write(0x0F, 0xFF);
        sid.write(0x12, 0x20); // sawtooth, gate not needed for OSC3

        for _ in 0..4 {
            sid.tick();
        }
        assert!(sid.read(0x1B) > 0);
    }

    #[test]
    fn env3_readback_tracks_envelope() {
        let mut sid = Sid6581::new(44_100);
        sid.write(0x13, 0x00);
        sid.write(0x14, 0xF0);
        sid.write(0x12, 0x01); // gate on

        for _ in 0..30 {
            sid.tick();
        }
        assert_eq!(sid.read(0x1C), 0xFF);
    }

    #[test]
    fn non_readable_registers_return_zero() {
        let mut sid = Sid6581::new(44_100);
        sid.write(0x00, 0xAB);
        sid.write(0x18, 0x5F);
        for reg in 0x00..0x1B {
            assert_eq!(sid.read(reg), 0, "Register {reg:#04X} is write-only");
        }
    }

    #[test]
    fn voice3_off_mutes_but_envelope_runs() {
        let mut sid = Sid6581::new(44_100);
        // Voice 3 alone, loud sawtooth, 3-off set
        sid.write(0x0E, 0x00);
        sid.write(0x0F, 0x10);
        sid.write(0x13, 0x00);
        sid.write(0x14, 0xF0);
        sid.write(0x12, 0x21);
        sid.write(0x18, 0x8F); // 3-off + volume 15

        for _ in 0..200 {
            sid.tick();
        }

        let buf = sid.take_samples();
        assert!(buf.iter().all(|s| s.abs() < 1e-6), "Voice 3 muted");
        assert!(sid.envelopes[2].level > 0, "Envelope still runs");
    }

    #[test]
    fn filter_routing_attenuates_high_voice() {
        let run = |filtered: bool| -> f32 {
            let mut sid = Sid6581::new(44_100);
            sid.write(0x00, 0xFF);
            sid.write(0x01, 0xFF); // maximum frequency
            sid.write(0x05, 0x00);
            sid.write(0x06, 0xF0);
            sid.write(0x04, 0x21);
            if filtered {
                sid.write(0x15, 0x00);
                sid.write(0x16, 0x00); // minimum cutoff
                sid.write(0x17, 0x01); // route voice 1
                sid.write(0x18, 0x1F); // LP + volume 15
            } else {
                sid.write(0x18, 0x0F);
            }
            for _ in 0..3000 {
                sid.tick();
            }
            let buf = sid.take_samples();
            let settled = &buf[buf.len() / 4..];
            (settled.iter().map(|s| s * s).sum::<f32>() / settled.len() as f32).sqrt()
        };

        let direct = run(false);
        let filtered = run(true);
        assert!(
            filtered < direct * 0.8,
            "LP at minimum cutoff attenuates: {filtered} vs {direct}"
        );
    }

    #[test]
    fn take_samples_drains() {
        let mut sid = Sid6581::new(44_100);
        for _ in 0..100 {
            sid.tick();
        }
        assert!(!sid.take_samples().is_empty());
        assert_eq!(sid.buffered_samples(), 0);
    }
}
