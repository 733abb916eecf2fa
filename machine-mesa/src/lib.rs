//! Mesa-8 microcomputer emulator.
//!
//! A 2 MHz 65C02 drives a fixed-decode slot bus of eight peripheral cards:
//! two banked-RAM cards, a DS1511-style real-time clock, a CF/IDE storage
//! card, an ACIA serial card, a 65C22 VIA carrying the input devices, a
//! 6581-style synthesizer and a TMS9918-family video processor. The
//! [`Mesa`] machine owns all of it, schedules device time against the CPU,
//! and exposes a callback surface to the host: video frames out, audio
//! samples out, serial bytes in both directions, keyboard and joystick in.

mod acia;
mod attachments;
mod bus;
mod config;
mod machine;
mod memory;
mod rtc;
mod storage;

pub use acia::Acia;
pub use attachments::{Joystick, JoystickPort, KeyboardEncoder, KeyboardMatrix};
pub use bus::IoBus;
pub use config::{MachineConfig, ResetKind};
pub use machine::{Mesa, StopHandle, TICK_INTERVAL};
pub use memory::{BankedRam, Rom, CART_BASE, RAM_SIZE, ROM_BASE, ROM_IMAGE_SIZE};
pub use rtc::Rtc;
pub use storage::{Storage, SECTOR_COUNT, SECTOR_SIZE, STORAGE_SIZE};

use thiserror::Error;

/// Host-boundary errors. Emulation-path operations are total and never
/// produce these; only image loading and backing-file I/O can fail, and
/// the machine recovers with safe defaults in every case.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("ROM image must be {expected} bytes, got {got}")]
    RomSize { expected: usize, got: usize },

    #[error("cartridge image must be {expected} bytes, got {got}")]
    CartSize { expected: usize, got: usize },

    #[error("storage image must be {expected} bytes, got {got}")]
    StorageImageSize { expected: usize, got: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
