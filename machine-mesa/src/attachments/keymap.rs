//! HID usage-ID mapping tables for the keyboard attachments.
//!
//! The matrix table assigns every physical key a (row, column) position;
//! the ASCII tables drive the keyboard encoder. F1-F10 have no matrix
//! position of their own: the matrix synthesizes them as Fn plus the
//! corresponding digit key.

use mesa_core::hid;

/// Matrix position of the Fn key (used to synthesize function keys).
pub const FN_POSITION: (u8, u8) = (7, 5);

/// Map a HID usage to its (row, column) matrix position.
///
/// Function keys return `None` here; the matrix handles them separately
/// via [`FN_POSITION`] plus the digit position.
pub fn matrix_position(usage: u8) -> Option<(u8, u8)> {
    let position = match usage {
        // Row 0: digit row, left half
        hid::KEY_1 => (0, 0),
        hid::KEY_2 => (0, 1),
        hid::KEY_3 => (0, 2),
        hid::KEY_4 => (0, 3),
        hid::KEY_5 => (0, 4),
        hid::KEY_6 => (0, 5),
        hid::KEY_7 => (0, 6),
        hid::KEY_8 => (0, 7),

        // Row 1: digit row tail and top letter row
        hid::KEY_9 => (1, 0),
        hid::KEY_0 => (1, 1),
        hid::KEY_MINUS => (1, 2),
        hid::KEY_EQUAL => (1, 3),
        hid::KEY_Q => (1, 4),
        hid::KEY_W => (1, 5),
        hid::KEY_E => (1, 6),
        hid::KEY_R => (1, 7),

        // Row 2
        hid::KEY_T => (2, 0),
        hid::KEY_Y => (2, 1),
        hid::KEY_U => (2, 2),
        hid::KEY_I => (2, 3),
        hid::KEY_O => (2, 4),
        hid::KEY_P => (2, 5),
        hid::KEY_LEFT_BRACKET => (2, 6),
        hid::KEY_RIGHT_BRACKET => (2, 7),

        // Row 3: home row
        hid::KEY_A => (3, 0),
        hid::KEY_S => (3, 1),
        hid::KEY_D => (3, 2),
        hid::KEY_F => (3, 3),
        hid::KEY_G => (3, 4),
        hid::KEY_H => (3, 5),
        hid::KEY_J => (3, 6),
        hid::KEY_K => (3, 7),

        // Row 4
        hid::KEY_L => (4, 0),
        hid::KEY_SEMICOLON => (4, 1),
        hid::KEY_APOSTROPHE => (4, 2),
        hid::KEY_GRAVE => (4, 3),
        hid::KEY_Z => (4, 4),
        hid::KEY_X => (4, 5),
        hid::KEY_C => (4, 6),
        hid::KEY_V => (4, 7),

        // Row 5
        hid::KEY_B => (5, 0),
        hid::KEY_N => (5, 1),
        hid::KEY_M => (5, 2),
        hid::KEY_COMMA => (5, 3),
        hid::KEY_PERIOD => (5, 4),
        hid::KEY_SLASH => (5, 5),
        hid::KEY_BACKSLASH => (5, 6),
        hid::KEY_SPACE => (5, 7),

        // Row 6: editing and arrows
        hid::KEY_ENTER => (6, 0),
        hid::KEY_BACKSPACE => (6, 1),
        hid::KEY_TAB => (6, 2),
        hid::KEY_ESCAPE => (6, 3),
        hid::KEY_UP => (6, 4),
        hid::KEY_DOWN => (6, 5),
        hid::KEY_LEFT => (6, 6),
        hid::KEY_RIGHT => (6, 7),

        // Row 7: modifiers
        hid::KEY_LEFT_SHIFT | hid::KEY_RIGHT_SHIFT => (7, 0),
        hid::KEY_LEFT_CTRL | hid::KEY_RIGHT_CTRL => (7, 1),
        hid::KEY_LEFT_ALT | hid::KEY_RIGHT_ALT => (7, 2),
        hid::KEY_LEFT_GUI | hid::KEY_RIGHT_GUI => (7, 3),
        hid::KEY_CAPS_LOCK => (7, 4),
        // (7, 5) is the Fn position
        hid::KEY_MENU => (7, 6),
        hid::KEY_DELETE => (7, 7),

        _ => return None,
    };
    Some(position)
}

/// Digit key carrying each function key when Fn is held (F10 = 0).
pub fn function_key_digit(usage: u8) -> Option<u8> {
    match usage {
        hid::KEY_F1 => Some(hid::KEY_1),
        hid::KEY_F2 => Some(hid::KEY_2),
        hid::KEY_F3 => Some(hid::KEY_3),
        hid::KEY_F4 => Some(hid::KEY_4),
        hid::KEY_F5 => Some(hid::KEY_5),
        hid::KEY_F6 => Some(hid::KEY_6),
        hid::KEY_F7 => Some(hid::KEY_7),
        hid::KEY_F8 => Some(hid::KEY_8),
        hid::KEY_F9 => Some(hid::KEY_9),
        hid::KEY_F10 => Some(hid::KEY_0),
        _ => None,
    }
}

/// Function key ordinal (F1 = 1 .. F15 = 15).
pub fn function_key_number(usage: u8) -> Option<u8> {
    match usage {
        hid::KEY_F1..=hid::KEY_F12 => Some(usage - hid::KEY_F1 + 1),
        // F13-F15 sit in the extended usage block
        0x68..=0x6A => Some(usage - 0x68 + 13),
        _ => None,
    }
}

/// Plain (unshifted) ASCII for a usage, where one exists.
pub fn hid_to_ascii(usage: u8) -> Option<u8> {
    let ascii = match usage {
        hid::KEY_A..=hid::KEY_Z => b'a' + (usage - hid::KEY_A),
        hid::KEY_1..=hid::KEY_9 => b'1' + (usage - hid::KEY_1),
        hid::KEY_0 => b'0',
        hid::KEY_ENTER => 0x0D,
        hid::KEY_ESCAPE => 0x1B,
        hid::KEY_BACKSPACE => 0x08,
        hid::KEY_TAB => 0x09,
        hid::KEY_SPACE => b' ',
        hid::KEY_MINUS => b'-',
        hid::KEY_EQUAL => b'=',
        hid::KEY_LEFT_BRACKET => b'[',
        hid::KEY_RIGHT_BRACKET => b']',
        hid::KEY_BACKSLASH => b'\\',
        hid::KEY_SEMICOLON => b';',
        hid::KEY_APOSTROPHE => b'\'',
        hid::KEY_GRAVE => b'`',
        hid::KEY_COMMA => b',',
        hid::KEY_PERIOD => b'.',
        hid::KEY_SLASH => b'/',
        hid::KEY_DELETE => 0x7F,
        _ => return None,
    };
    Some(ascii)
}

/// Shifted ASCII for a usage.
pub fn shifted_ascii(usage: u8) -> Option<u8> {
    let ascii = match usage {
        hid::KEY_A..=hid::KEY_Z => b'A' + (usage - hid::KEY_A),
        hid::KEY_1 => b'!',
        hid::KEY_2 => b'@',
        hid::KEY_3 => b'#',
        hid::KEY_4 => b'$',
        hid::KEY_5 => b'%',
        hid::KEY_6 => b'^',
        hid::KEY_7 => b'&',
        hid::KEY_8 => b'*',
        hid::KEY_9 => b'(',
        hid::KEY_0 => b')',
        hid::KEY_MINUS => b'_',
        hid::KEY_EQUAL => b'+',
        hid::KEY_LEFT_BRACKET => b'{',
        hid::KEY_RIGHT_BRACKET => b'}',
        hid::KEY_BACKSLASH => b'|',
        hid::KEY_SEMICOLON => b':',
        hid::KEY_APOSTROPHE => b'"',
        hid::KEY_GRAVE => b'~',
        hid::KEY_COMMA => b'<',
        hid::KEY_PERIOD => b'>',
        hid::KEY_SLASH => b'?',
        _ => return hid_to_ascii(usage),
    };
    Some(ascii)
}

/// Control codes for Ctrl plus a non-letter key (the classic terminal
/// assignments).
pub fn ctrl_symbol_code(usage: u8) -> Option<u8> {
    let code = match usage {
        hid::KEY_2 => 0x00,          // Ctrl-@
        hid::KEY_6 => 0x1E,          // Ctrl-^
        hid::KEY_MINUS => 0x1F,      // Ctrl-_
        hid::KEY_LEFT_BRACKET => 0x1B,
        hid::KEY_BACKSLASH => 0x1C,
        hid::KEY_RIGHT_BRACKET => 0x1D,
        hid::KEY_SPACE => 0x00,
        _ => return None,
    };
    Some(code)
}
