//! Keyboard matrix attachment.
//!
//! 8x8 key matrix scanned through the VIA: Port B writes select columns
//! (active low), Port A reads return the row lines (active low: a 0 bit
//! means a key in a selected column of that row is down).

use super::keymap;
use via_65c22::ViaAttachment;

/// 8x8 keyboard matrix on VIA ports A (rows) and B (columns).
pub struct KeyboardMatrix {
    /// `keys[row]` has bit `col` set while that key is pressed.
    keys: [u8; 8],
    /// Effective column-select lines from the last Port B write
    /// (active low; undriven lines float high).
    column_select: u8,
}

impl KeyboardMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: [0; 8],
            column_select: 0xFF,
        }
    }

    /// Press the key for a HID usage. F1-F10 synthesize Fn + digit.
    pub fn key_down(&mut self, usage: u8) {
        if let Some(digit) = keymap::function_key_digit(usage) {
            self.set_key(keymap::FN_POSITION, true);
            if let Some(position) = keymap::matrix_position(digit) {
                self.set_key(position, true);
            }
            return;
        }
        if let Some(position) = keymap::matrix_position(usage) {
            self.set_key(position, true);
        }
    }

    /// Release the key for a HID usage.
    pub fn key_up(&mut self, usage: u8) {
        if let Some(digit) = keymap::function_key_digit(usage) {
            self.set_key(keymap::FN_POSITION, false);
            if let Some(position) = keymap::matrix_position(digit) {
                self.set_key(position, false);
            }
            return;
        }
        if let Some(position) = keymap::matrix_position(usage) {
            self.set_key(position, false);
        }
    }

    /// Release everything.
    pub fn release_all(&mut self) {
        self.keys = [0; 8];
    }

    fn set_key(&mut self, (row, col): (u8, u8), pressed: bool) {
        if pressed {
            self.keys[usize::from(row)] |= 1 << col;
        } else {
            self.keys[usize::from(row)] &= !(1 << col);
        }
    }

    /// Row lines for the currently selected columns.
    fn scan(&self) -> u8 {
        let selected = !self.column_select;
        let mut rows = 0xFF;
        for (row, &row_keys) in self.keys.iter().enumerate() {
            if row_keys & selected != 0 {
                rows &= !(1 << row);
            }
        }
        rows
    }
}

impl Default for KeyboardMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl ViaAttachment for KeyboardMatrix {
    fn priority(&self) -> u8 {
        1
    }

    fn reset(&mut self) {
        self.release_all();
        self.column_select = 0xFF;
    }

    fn read_port_a(&mut self, _ddr: u8, _or: u8) -> u8 {
        self.scan()
    }

    fn write_port_b(&mut self, value: u8, ddr: u8) {
        // Only driven lines select; input lines float high
        self.column_select = value | !ddr;
    }
}
