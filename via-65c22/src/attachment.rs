//! VIA port attachment protocol.
//!
//! Devices on the VIA ports (keyboard matrix, keyboard encoder, joystick)
//! implement [`ViaAttachment`]. The VIA owns two priority-ordered lists of
//! attachments, polls their interrupt lines each tick, fans port writes out
//! to them, and ANDs their port reads together (open-collector: any
//! attachment pulling a bit low wins).
//!
//! Attachments are shared `Rc<RefCell<_>>` handles so the machine can keep
//! a handle for injecting host input while the VIA scans the same object.

use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a port attachment.
pub type AttachmentHandle = Rc<RefCell<dyn ViaAttachment>>;

/// A device attached to one (or both) of the VIA's ports.
///
/// Every method has a default so simple attachments only implement what
/// they use. `priority` is observable: it decides scan order within a
/// port's list (lower scans first).
pub trait ViaAttachment {
    /// Scan priority, lower first.
    fn priority(&self) -> u8;

    /// Reset device state.
    fn reset(&mut self) {}

    /// Advance internal state. Called once per VIA tick batch.
    fn tick(&mut self) {}

    /// Whether the attachment currently participates in port reads and
    /// interrupt polling.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Contribution to Port A input lines (active level). Bits the device
    /// does not drive must read 1.
    fn read_port_a(&mut self, _ddr: u8, _or: u8) -> u8 {
        0xFF
    }

    /// Contribution to Port B input lines.
    fn read_port_b(&mut self, _ddr: u8, _or: u8) -> u8 {
        0xFF
    }

    /// Observe a CPU write to Port A.
    fn write_port_a(&mut self, _value: u8, _ddr: u8) {}

    /// Observe a CPU write to Port B.
    fn write_port_b(&mut self, _value: u8, _ddr: u8) {}

    /// Handshake notification: the CPU accessed a port data register, so
    /// the named control-line interrupts were acknowledged.
    fn clear_interrupts(&mut self, _ca1: bool, _ca2: bool, _cb1: bool, _cb2: bool) {}

    /// The VIA's control-line output levels changed.
    fn update_control_lines(&mut self, _ca1: bool, _ca2: bool, _cb1: bool, _cb2: bool) {}

    /// Interrupt line polls, sampled once per tick batch.
    fn has_ca1_interrupt(&mut self) -> bool {
        false
    }

    fn has_ca2_interrupt(&mut self) -> bool {
        false
    }

    fn has_cb1_interrupt(&mut self) -> bool {
        false
    }

    fn has_cb2_interrupt(&mut self) -> bool {
        false
    }
}
