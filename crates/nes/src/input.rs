//! Joypad input
//!
//! The NES has two controller ports. A poll returns the eight buttons of
//! one pad as a bitmask, laid out like the cc65 joystick driver.
//!
//! # Example
//!
//! ```
//! use nes::input::{Button, Buttons};
//!
//! let joy = Button::UP | Button::START;
//! assert!(joy.up());
//! assert!(joy.start());
//! assert!(!joy.left());
//! ```

/// Button flags
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    /// A button
    A = 0x01,
    /// B button
    B = 0x02,
    /// Select button
    SELECT = 0x04,
    /// Start button
    START = 0x08,
    /// D-pad Up
    UP = 0x10,
    /// D-pad Down
    DOWN = 0x20,
    /// D-pad Left
    LEFT = 0x40,
    /// D-pad Right
    RIGHT = 0x80,
}

/// Snapshot of one pad, pressed buttons as set bits
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Buttons(pub u8);

impl Buttons {
    /// No buttons pressed
    pub const NONE: Buttons = Buttons(0);

    /// Check if a specific button is pressed
    #[inline]
    pub const fn contains(self, button: Button) -> bool {
        (self.0 & button as u8) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn up(self) -> bool {
        self.contains(Button::UP)
    }

    #[inline]
    pub const fn down(self) -> bool {
        self.contains(Button::DOWN)
    }

    #[inline]
    pub const fn left(self) -> bool {
        self.contains(Button::LEFT)
    }

    #[inline]
    pub const fn right(self) -> bool {
        self.contains(Button::RIGHT)
    }

    #[inline]
    pub const fn start(self) -> bool {
        self.contains(Button::START)
    }
}

impl From<Button> for Buttons {
    fn from(button: Button) -> Buttons {
        Buttons(button as u8)
    }
}

impl core::ops::BitOr for Button {
    type Output = Buttons;
    fn bitor(self, other: Button) -> Buttons {
        Buttons(self as u8 | other as u8)
    }
}

impl core::ops::BitOr<Button> for Buttons {
    type Output = Buttons;
    fn bitor(self, other: Button) -> Buttons {
        Buttons(self.0 | other as u8)
    }
}

impl core::ops::BitOrAssign<Button> for Buttons {
    fn bitor_assign(&mut self, other: Button) {
        self.0 |= other as u8;
    }
}

/// Controller port access
pub trait Joypad {
    /// Read the current state of pad `port` (0 or 1)
    fn poll(&mut self, port: u8) -> Buttons;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_combination() {
        let mut joy = Button::LEFT | Button::A;
        assert!(joy.left());
        assert!(joy.contains(Button::A));
        assert!(!joy.right());

        joy |= Button::START;
        assert!(joy.start());
        assert_eq!(joy.0, 0x49);
    }

    #[test]
    fn test_none_is_empty() {
        assert!(Buttons::NONE.is_empty());
        assert!(!Buttons::from(Button::DOWN).is_empty());
    }
}
