//! Joystick attachment.

use via_65c22::ViaAttachment;

/// Which VIA port the joystick answers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoystickPort {
    A,
    B,
}

/// Eight-button joystick, presented active-low on its configured port.
///
/// Button masks follow `mesa_core::joystick` (UP/DOWN/LEFT/RIGHT then
/// A/B/SELECT/START).
pub struct Joystick {
    port: JoystickPort,
    /// Current button state, 1 = held.
    buttons: u8,
}

impl Joystick {
    #[must_use]
    pub fn new(port: JoystickPort) -> Self {
        Self { port, buttons: 0 }
    }

    /// Replace the whole button state.
    pub fn set_state(&mut self, buttons: u8) {
        self.buttons = buttons;
    }

    /// Current button state.
    #[must_use]
    pub fn state(&self) -> u8 {
        self.buttons
    }
}

impl ViaAttachment for Joystick {
    fn priority(&self) -> u8 {
        3
    }

    fn reset(&mut self) {
        self.buttons = 0;
    }

    fn read_port_a(&mut self, _ddr: u8, _or: u8) -> u8 {
        if self.port == JoystickPort::A {
            !self.buttons
        } else {
            0xFF
        }
    }

    fn read_port_b(&mut self, _ddr: u8, _or: u8) -> u8 {
        if self.port == JoystickPort::B {
            !self.buttons
        } else {
            0xFF
        }
    }
}
