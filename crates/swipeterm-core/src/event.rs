#![forbid(unsafe_code)]

//! Canonical mouse event types.
//!
//! Events carry 0-based terminal cell coordinates (the SGR wire format is
//! 1-based; the decoder converts). The raw protocol button code is preserved
//! on every event because the motion (bit 32), scroll (bit 64), and modifier
//! (bits 4/8/16) flags are only recoverable from it.

use bitflags::bitflags;

/// Mouse button identifiers, including the scroll wheel pseudo-buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,

    /// Middle mouse button (scroll wheel click).
    Middle,

    /// Right mouse button.
    Right,

    /// Mouse wheel scrolled up.
    WheelUp,

    /// Mouse wheel scrolled down.
    WheelDown,
}

bitflags! {
    /// Modifier keys held during a mouse event, decoded from the SGR
    /// button code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b000;
        /// Shift key.
        const SHIFT = 0b001;
        /// Alt/Option key.
        const ALT   = 0b010;
        /// Control key.
        const CTRL  = 0b100;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A decoded mouse event.
///
/// Immutable once constructed; handlers receive it by shared reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// X coordinate (0-indexed, leftmost column is 0).
    pub x: u16,

    /// Y coordinate (0-indexed, topmost row is 0).
    pub y: u16,

    /// `true` for a press report, `false` for a release report.
    pub press: bool,

    /// The decoded button.
    pub button: MouseButton,

    /// Raw protocol button code, kept for motion/scroll/modifier bit tests.
    pub raw_button: u16,
}

impl MouseEvent {
    /// Create a new mouse event with a zero raw button code.
    #[must_use]
    pub const fn new(button: MouseButton, x: u16, y: u16, press: bool) -> Self {
        Self {
            x,
            y,
            press,
            button,
            raw_button: 0,
        }
    }

    /// Attach the raw protocol button code.
    #[must_use]
    pub const fn with_raw_button(mut self, raw_button: u16) -> Self {
        self.raw_button = raw_button;
        self
    }

    /// Get the position as a tuple.
    #[must_use]
    pub const fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    /// Whether the raw code carries the drag/motion bit.
    #[must_use]
    pub const fn is_motion(&self) -> bool {
        self.raw_button & 32 != 0
    }

    /// Whether the raw code carries the scroll bit.
    #[must_use]
    pub const fn is_scroll(&self) -> bool {
        self.raw_button & 64 != 0
    }

    /// Modifier keys held during the event, decoded from the raw code.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        let mut mods = Modifiers::NONE;
        if self.raw_button & 4 != 0 {
            mods |= Modifiers::SHIFT;
        }
        if self.raw_button & 8 != 0 {
            mods |= Modifiers::ALT;
        }
        if self.raw_button & 16 != 0 {
            mods |= Modifiers::CTRL;
        }
        mods
    }
}
