#![forbid(unsafe_code)]

//! Normalized pointer and touch input.
//!
//! Hosts translate their native pointer/touch events into these types before
//! handing them to the layout engine. Only the fields the engine inspects are
//! carried.

use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

bitflags! {
    /// Modifier keys held during one pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    /// Copy-drag modifier (Ctrl on most platforms, Alt/Option on macOS hosts).
    #[must_use]
    pub const fn wants_copy(self) -> bool {
        self.intersects(Self::CTRL.union(Self::ALT))
    }
}

/// Touch phases the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One normalized touch event for a single tracked finger.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Host touch identifier (stable for one finger across a gesture).
    pub touch_id: u32,
    pub position: Point,
}

impl TouchEvent {
    #[must_use]
    pub const fn new(phase: TouchPhase, touch_id: u32, position: Point) -> Self {
        Self {
            phase,
            touch_id,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_modifier_detection() {
        assert!(!Modifiers::default().wants_copy());
        assert!(!Modifiers::SHIFT.wants_copy());
        assert!(Modifiers::CTRL.wants_copy());
        assert!((Modifiers::ALT | Modifiers::SHIFT).wants_copy());
    }
}
