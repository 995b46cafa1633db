//! Input event table.
//!
//! Hosts translate their native events (DOM, winit, test harnesses) into
//! [`InputEvent`] values and feed them to [`crate::Studio::dispatch`], the
//! single registration point that routes them to the viewport controller and
//! the scene manager. Handlers run to completion before the next event is
//! processed; nothing here is reentrant.

use crate::foundation::core::Point;

/// One mouse-wheel tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelEvent {
    /// Cursor position in view/device coordinates.
    pub position: Point,
    pub delta_x: f64,
    pub delta_y: f64,
    /// Whether the zoom modifier (ctrl/cmd) is held; without it the wheel
    /// pans instead of zooming.
    pub zoom_modifier: bool,
}

/// Keys the core reacts to; everything else arrives as `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Space,
    Digit0,
    Delete,
    Backspace,
    Other,
}

/// Events dispatched through [`crate::Studio::dispatch`].
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Wheel(WheelEvent),
    KeyDown {
        key: Key,
        /// Keyboard shortcuts are suppressed while a text input has focus.
        text_input_focused: bool,
    },
    KeyUp {
        key: Key,
    },
    PointerDown {
        position: Point,
    },
    PointerMove {
        position: Point,
    },
    PointerUp,
    /// A click or tap that completed without dragging; drives selection.
    Tap {
        position: Point,
    },
    TouchStart {
        touches: Vec<Point>,
    },
    TouchMove {
        touches: Vec<Point>,
    },
    TouchEnd {
        /// Touch points still down after the lift.
        remaining: Vec<Point>,
    },
}
