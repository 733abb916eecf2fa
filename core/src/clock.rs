//! Master clock configuration.

/// Master clock configuration for the machine.
///
/// The CPU crystal drives all timing. Devices run at divided or scaled
/// rates, but everything derives from this frequency.
#[derive(Debug, Clone, Copy)]
pub struct MasterClock {
    /// Crystal frequency in Hz (2_000_000 for the stock Mesa-8).
    pub frequency_hz: u32,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u32) -> Self {
        Self { frequency_hz }
    }

    /// CPU cycles owed for the given elapsed wall-clock microseconds.
    #[must_use]
    pub const fn cycles_for_micros(&self, micros: u64) -> u64 {
        micros * self.frequency_hz as u64 / 1_000_000
    }

    /// CPU cycles per video frame at the given frame rate.
    #[must_use]
    pub const fn cycles_per_frame(&self, frames_per_second: u32) -> u32 {
        self.frequency_hz / frames_per_second
    }
}
