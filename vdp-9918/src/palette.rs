//! TMS9918A colour palette.
//!
//! 15 fixed colours plus transparent (index 0), as RGBA byte quadruples.
//! Transparent pixels render as the backdrop colour, so index 0 here only
//! shows through when the backdrop register itself selects it.

/// Palette indexed 0-15, each entry R, G, B, A.
pub const PALETTE: [[u8; 4]; 16] = [
    [0x00, 0x00, 0x00, 0xFF], // 0: Transparent
    [0x00, 0x00, 0x00, 0xFF], // 1: Black
    [0x21, 0xC8, 0x42, 0xFF], // 2: Medium Green
    [0x5E, 0xDC, 0x78, 0xFF], // 3: Light Green
    [0x54, 0x55, 0xED, 0xFF], // 4: Dark Blue
    [0x7D, 0x76, 0xFC, 0xFF], // 5: Light Blue
    [0xD4, 0x52, 0x4D, 0xFF], // 6: Dark Red
    [0x42, 0xEB, 0xF5, 0xFF], // 7: Cyan
    [0xFC, 0x55, 0x54, 0xFF], // 8: Medium Red
    [0xFF, 0x79, 0x78, 0xFF], // 9: Light Red
    [0xD4, 0xC1, 0x54, 0xFF], // 10: Dark Yellow
    [0xE6, 0xCE, 0x80, 0xFF], // 11: Light Yellow
    [0x21, 0xB0, 0x3B, 0xFF], // 12: Dark Green
    [0xC9, 0x5B, 0xBA, 0xFF], // 13: Magenta
    [0xCC, 0xCC, 0xCC, 0xFF], // 14: Grey
    [0xFF, 0xFF, 0xFF, 0xFF], // 15: White
];
