//! VIA port attachments: keyboard matrix, keyboard encoder, joystick.

mod encoder;
mod joystick;
mod keyboard;
mod keymap;

pub use encoder::KeyboardEncoder;
pub use joystick::{Joystick, JoystickPort};
pub use keyboard::KeyboardMatrix;
