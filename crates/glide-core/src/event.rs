#![forbid(unsafe_code)]

//! Canonical pointer and touch input consumed by the carousel.
//!
//! Hosts translate their native events (DOM `mousedown`/`touchmove`, winit
//! cursor events, ...) into [`InputEvent`] values. Only the horizontal
//! coordinate matters to a horizontal slide strip, so events carry `x` alone.
//!
//! Touch events carry the *changed* touch points of the native event, not
//! every touch on the surface. A multi-touch move therefore lists whichever
//! fingers moved, and the gesture tracker picks out the one it follows.

use bitflags::bitflags;

bitflags! {
    /// Set of input modalities (mouse, touch).
    ///
    /// Used for the enabled-modality configuration and for the trigger and
    /// global listener sets the host keeps bound.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputModalities: u8 {
        /// No modality.
        const NONE  = 0b00;
        /// Mouse buttons and cursor motion.
        const MOUSE = 0b01;
        /// Touch points.
        const TOUCH = 0b10;
    }
}

impl Default for InputModalities {
    fn default() -> Self {
        Self::NONE
    }
}

/// Which pointer a drag session follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerIdentity {
    /// The mouse cursor.
    Mouse,
    /// One specific touch point, by its host-assigned identifier.
    Touch(u32),
}

impl PointerIdentity {
    /// The modality this identity belongs to.
    #[must_use]
    pub const fn modality(self) -> InputModalities {
        match self {
            Self::Mouse => InputModalities::MOUSE,
            Self::Touch(_) => InputModalities::TOUCH,
        }
    }
}

/// Mouse lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MousePhase {
    /// Primary button pressed on the carousel element.
    Down,
    /// Cursor moved (delivered through global listeners).
    Move,
    /// Button released anywhere (delivered through global listeners).
    Up,
}

/// Touch lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// One or more touches began on the carousel element.
    Start,
    /// One or more touches moved.
    Move,
    /// One or more touches lifted.
    End,
    /// The platform cancelled one or more touches.
    Cancel,
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseInput {
    /// Lifecycle phase.
    pub phase: MousePhase,
    /// Horizontal coordinate in CSS pixels.
    pub x: f64,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Host-assigned identifier, stable for the lifetime of the touch.
    pub id: u32,
    /// Horizontal coordinate in CSS pixels.
    pub x: f64,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub const fn new(id: u32, x: f64) -> Self {
        Self { id, x }
    }
}

/// A touch event with its changed touch points.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchInput {
    /// Lifecycle phase.
    pub phase: TouchPhase,
    /// Touch points that changed in this event.
    pub touches: Vec<TouchPoint>,
}

impl TouchInput {
    /// Find the touch point with the given identifier.
    #[must_use]
    pub fn find(&self, id: u32) -> Option<&TouchPoint> {
        self.touches.iter().find(|touch| touch.id == id)
    }
}

/// Canonical carousel input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse event.
    Mouse(MouseInput),
    /// Touch event.
    Touch(TouchInput),
}

impl InputEvent {
    /// Mouse button pressed at `x`.
    #[must_use]
    pub const fn mouse_down(x: f64) -> Self {
        Self::Mouse(MouseInput {
            phase: MousePhase::Down,
            x,
        })
    }

    /// Mouse moved to `x`.
    #[must_use]
    pub const fn mouse_move(x: f64) -> Self {
        Self::Mouse(MouseInput {
            phase: MousePhase::Move,
            x,
        })
    }

    /// Mouse button released at `x`.
    #[must_use]
    pub const fn mouse_up(x: f64) -> Self {
        Self::Mouse(MouseInput {
            phase: MousePhase::Up,
            x,
        })
    }

    /// Touch event with the given phase and changed touches.
    #[must_use]
    pub fn touch(phase: TouchPhase, touches: impl IntoIterator<Item = TouchPoint>) -> Self {
        Self::Touch(TouchInput {
            phase,
            touches: touches.into_iter().collect(),
        })
    }

    /// Single-finger touch start.
    #[must_use]
    pub fn touch_start(id: u32, x: f64) -> Self {
        Self::touch(TouchPhase::Start, [TouchPoint::new(id, x)])
    }

    /// Single-finger touch move.
    #[must_use]
    pub fn touch_move(id: u32, x: f64) -> Self {
        Self::touch(TouchPhase::Move, [TouchPoint::new(id, x)])
    }

    /// Single-finger touch end.
    #[must_use]
    pub fn touch_end(id: u32, x: f64) -> Self {
        Self::touch(TouchPhase::End, [TouchPoint::new(id, x)])
    }

    /// Single-finger touch cancel.
    #[must_use]
    pub fn touch_cancel(id: u32, x: f64) -> Self {
        Self::touch(TouchPhase::Cancel, [TouchPoint::new(id, x)])
    }

    /// The modality this event belongs to.
    #[must_use]
    pub const fn modality(&self) -> InputModalities {
        match self {
            Self::Mouse(_) => InputModalities::MOUSE,
            Self::Touch(_) => InputModalities::TOUCH,
        }
    }

    /// Whether this event can begin a drag (mouse down / touch start).
    #[must_use]
    pub fn is_start(&self) -> bool {
        match self {
            Self::Mouse(mouse) => mouse.phase == MousePhase::Down,
            Self::Touch(touch) => touch.phase == TouchPhase::Start,
        }
    }
}
