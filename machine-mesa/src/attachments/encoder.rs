//! Keyboard encoder attachment.
//!
//! Encodes key presses into single bytes on the VIA port data lines, with
//! a data-ready interrupt per port. A port participates while the VIA
//! drives its C2 line low; the matching C1 interrupt fires when a byte is
//! latched and clears when the port's data register is read (the VIA
//! relays that through `clear_interrupts`).
//!
//! Key releases never produce output; they only update modifier state.

use super::keymap;
use via_65c22::ViaAttachment;

use mesa_core::hid;

/// ASCII-encoding keyboard controller on the VIA ports.
pub struct KeyboardEncoder {
    /// Latched output byte.
    data: u8,
    /// Port A enabled (CA2 driven low).
    enabled_a: bool,
    /// Port B enabled (CB2 driven low).
    enabled_b: bool,
    /// Data-ready interrupt lines.
    ready_a: bool,
    ready_b: bool,

    // Modifier state, tracked across events
    shift: bool,
    ctrl: bool,
    alt: bool,
    gui: bool,
}

impl KeyboardEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: 0,
            enabled_a: false,
            enabled_b: false,
            ready_a: false,
            ready_b: false,
            shift: false,
            ctrl: false,
            alt: false,
            gui: false,
        }
    }

    /// Process a key press.
    pub fn key_down(&mut self, usage: u8) {
        match usage {
            hid::KEY_LEFT_SHIFT | hid::KEY_RIGHT_SHIFT => {
                self.shift = true;
            }
            hid::KEY_LEFT_CTRL | hid::KEY_RIGHT_CTRL => {
                self.ctrl = true;
            }
            hid::KEY_LEFT_ALT | hid::KEY_RIGHT_ALT => {
                self.alt = true;
            }
            hid::KEY_LEFT_GUI | hid::KEY_RIGHT_GUI => {
                // GUI is tracked as a modifier but also emits its own code
                self.gui = true;
                self.emit(if self.alt { 0x90 } else { 0x80 });
            }
            _ => {
                if let Some(byte) = self.encode(usage) {
                    self.emit(byte);
                }
            }
        }
    }

    /// Process a key release (modifier bookkeeping only).
    pub fn key_up(&mut self, usage: u8) {
        match usage {
            hid::KEY_LEFT_SHIFT | hid::KEY_RIGHT_SHIFT => self.shift = false,
            hid::KEY_LEFT_CTRL | hid::KEY_RIGHT_CTRL => self.ctrl = false,
            hid::KEY_LEFT_ALT | hid::KEY_RIGHT_ALT => self.alt = false,
            hid::KEY_LEFT_GUI | hid::KEY_RIGHT_GUI => self.gui = false,
            _ => {}
        }
    }

    /// The latched output byte (diagnostics).
    #[must_use]
    pub fn data(&self) -> u8 {
        self.data
    }

    /// Encode a non-modifier key press under the current modifier state.
    ///
    /// Priority order: Menu, function keys, Ctrl+letter, Ctrl+symbol,
    /// Alt+Shift extended, Alt extended, Shift, plain.
    fn encode(&self, usage: u8) -> Option<u8> {
        if usage == hid::KEY_MENU {
            return Some(if self.alt { 0x90 } else { 0x80 });
        }

        if let Some(n) = keymap::function_key_number(usage) {
            let base = if self.alt { 0x90 } else { 0x80 };
            return Some(base + n);
        }

        if self.ctrl {
            if (hid::KEY_A..=hid::KEY_Z).contains(&usage) {
                return Some(usage - hid::KEY_A + 1);
            }
            if let Some(code) = keymap::ctrl_symbol_code(usage) {
                return Some(code);
            }
        }

        if self.alt && self.shift {
            return keymap::shifted_ascii(usage).map(|ascii| ascii | 0x80);
        }
        if self.alt {
            return keymap::hid_to_ascii(usage).map(|ascii| ascii | 0x80);
        }
        if self.shift {
            return keymap::shifted_ascii(usage);
        }
        keymap::hid_to_ascii(usage)
    }

    fn emit(&mut self, byte: u8) {
        self.data = byte;
        if self.enabled_a {
            self.ready_a = true;
        }
        if self.enabled_b {
            self.ready_b = true;
        }
    }
}

impl Default for KeyboardEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ViaAttachment for KeyboardEncoder {
    fn priority(&self) -> u8 {
        2
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn read_port_a(&mut self, _ddr: u8, _or: u8) -> u8 {
        if self.enabled_a {
            self.data
        } else {
            0xFF
        }
    }

    fn read_port_b(&mut self, _ddr: u8, _or: u8) -> u8 {
        if self.enabled_b {
            self.data
        } else {
            0xFF
        }
    }

    fn clear_interrupts(&mut self, ca1: bool, _ca2: bool, cb1: bool, _cb2: bool) {
        if ca1 {
            self.ready_a = false;
        }
        if cb1 {
            self.ready_b = false;
        }
    }

    fn update_control_lines(&mut self, _ca1: bool, ca2: bool, _cb1: bool, cb2: bool) {
        self.enabled_a = !ca2;
        self.enabled_b = !cb2;
    }

    fn has_ca1_interrupt(&mut self) -> bool {
        self.ready_a
    }

    fn has_cb1_interrupt(&mut self) -> bool {
        self.ready_b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_encoder() -> KeyboardEncoder {
        let mut encoder = KeyboardEncoder::new();
        encoder.update_control_lines(true, false, true, true); // CA2 low
        encoder
    }

    fn press(encoder: &mut KeyboardEncoder, usage: u8) -> u8 {
        encoder.key_down(usage);
        encoder.key_up(usage);
        encoder.data()
    }

    #[test]
    fn plain_letters_and_digits() {
        let mut encoder = enabled_encoder();
        assert_eq!(press(&mut encoder, hid::KEY_A), b'a');
        assert_eq!(press(&mut encoder, hid::KEY_5), b'5');
        assert_eq!(press(&mut encoder, hid::KEY_ENTER), 0x0D);
    }

    #[test]
    fn shift_produces_uppercase_and_symbols() {
        let mut encoder = enabled_encoder();
        encoder.key_down(hid::KEY_LEFT_SHIFT);
        assert_eq!(press(&mut encoder, hid::KEY_A), b'A');
        assert_eq!(press(&mut encoder, hid::KEY_2), b'@');
        encoder.key_up(hid::KEY_LEFT_SHIFT);
        assert_eq!(press(&mut encoder, hid::KEY_A), b'a');
    }

    #[test]
    fn ctrl_letters_are_control_codes() {
        let mut encoder = enabled_encoder();
        encoder.key_down(hid::KEY_LEFT_CTRL);
        assert_eq!(press(&mut encoder, hid::KEY_A), 0x01);
        assert_eq!(press(&mut encoder, hid::KEY_Z), 0x1A);
        assert_eq!(press(&mut encoder, hid::KEY_LEFT_BRACKET), 0x1B);
        assert_eq!(press(&mut encoder, hid::KEY_6), 0x1E);
    }

    #[test]
    fn function_keys_with_and_without_alt() {
        let mut encoder = enabled_encoder();
        assert_eq!(press(&mut encoder, hid::KEY_F1), 0x81);
        assert_eq!(press(&mut encoder, hid::KEY_F12), 0x8C);

        encoder.key_down(hid::KEY_LEFT_ALT);
        assert_eq!(press(&mut encoder, hid::KEY_F1), 0x91);
        assert_eq!(press(&mut encoder, hid::KEY_F12), 0x9C);
    }

    #[test]
    fn menu_and_gui_codes() {
        let mut encoder = enabled_encoder();
        assert_eq!(press(&mut encoder, hid::KEY_MENU), 0x80);

        encoder.key_down(hid::KEY_LEFT_ALT);
        assert_eq!(press(&mut encoder, hid::KEY_MENU), 0x90);
        encoder.key_up(hid::KEY_LEFT_ALT);

        encoder.key_down(hid::KEY_LEFT_GUI);
        assert_eq!(encoder.data(), 0x80, "GUI press emits its own code");
    }

    #[test]
    fn alt_tables_set_the_high_bit() {
        let mut encoder = enabled_encoder();
        encoder.key_down(hid::KEY_LEFT_ALT);
        assert_eq!(press(&mut encoder, hid::KEY_A), b'a' | 0x80);

        encoder.key_down(hid::KEY_LEFT_SHIFT);
        assert_eq!(press(&mut encoder, hid::KEY_A), b'A' | 0x80);
    }

    #[test]
    fn releases_produce_no_output() {
        let mut encoder = enabled_encoder();
        press(&mut encoder, hid::KEY_A);
        encoder.clear_interrupts(true, false, false, false);
        encoder.key_up(hid::KEY_B);
        assert!(!encoder.has_ca1_interrupt(), "Key-up is silent");
    }

    #[test]
    fn ready_flag_follows_port_enable() {
        let mut encoder = KeyboardEncoder::new();
        // Disabled on both ports: data latches, no interrupt
        encoder.key_down(hid::KEY_A);
        assert!(!encoder.has_ca1_interrupt());
        assert!(!encoder.has_cb1_interrupt());

        // Enable port B only
        encoder.update_control_lines(true, true, true, false);
        encoder.key_down(hid::KEY_B);
        assert!(!encoder.has_ca1_interrupt());
        assert!(encoder.has_cb1_interrupt());
        assert_eq!(encoder.read_port_b(0, 0), b'b');
        assert_eq!(encoder.read_port_a(0, 0), 0xFF, "Disabled port floats");

        encoder.clear_interrupts(false, false, true, false);
        assert!(!encoder.has_cb1_interrupt());
    }

    #[test]
    fn modifier_state_tracks_across_events() {
        let mut encoder = enabled_encoder();
        encoder.key_down(hid::KEY_LEFT_SHIFT);
        encoder.key_down(hid::KEY_LEFT_CTRL);
        // Ctrl outranks Shift in the priority order
        assert_eq!(press(&mut encoder, hid::KEY_C), 0x03);
        encoder.key_up(hid::KEY_LEFT_CTRL);
        assert_eq!(press(&mut encoder, hid::KEY_C), b'C');
    }
}
