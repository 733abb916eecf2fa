//! Machine configuration.

use std::path::PathBuf;

/// Reset depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetKind {
    /// Power-on: clears RAM, banked RAM and VRAM, reseeds the RTC from the
    /// host wall clock.
    #[default]
    Cold,
    /// Preserves memory, time and NV RAM; clears volatile device state and
    /// restarts the CPU through the reset vector.
    Warm,
}

/// Mesa-8 configuration.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    /// CPU crystal frequency in Hz.
    pub cpu_frequency_hz: u32,
    /// Audio output sample rate in Hz.
    pub sample_rate: u32,
    /// Host display scale factor. Presentation metadata only; the core
    /// always renders at native 320x240.
    pub display_scale: u32,
    /// Override for the host-side serial rate (50..19200). `None` follows
    /// the guest's control register.
    pub host_baud: Option<u32>,
    /// Reset depth applied at construction.
    pub reset: ResetKind,
    /// Optional CF backing file, loaded at start and written by
    /// `save_storage`.
    pub storage_path: Option<PathBuf>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            cpu_frequency_hz: 2_000_000,
            sample_rate: 44_100,
            display_scale: 2,
            host_baud: None,
            reset: ResetKind::Cold,
            storage_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_stock_machine() {
        let config = MachineConfig::default();
        assert_eq!(config.cpu_frequency_hz, 2_000_000);
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.reset, ResetKind::Cold);
        assert!(config.storage_path.is_none());
    }
}
