#![forbid(unsafe_code)]

//! Drag tracking: turns pointer/touch events into a live offset and a commit
//! decision.
//!
//! [`GestureTracker`] owns at most one [`DragSession`]. A session begins on
//! mouse-down or touch-start, follows exactly one pointer, and ends on
//! mouse-up or on touch end/cancel for the tracked touch. Ending a session
//! yields a [`DragRelease`] carrying the direction decision for navigation.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──start──▶ Dragging ──move (same pointer)──▶ Dragging
//!    ▲                 │
//!    └──release/cancel─┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one session exists. A start while dragging is ignored and leaves
//!    the session's origin and viewport width untouched.
//! 2. `viewport_width` is captured once at start; later resizes do not change
//!    the snap threshold of the running session.
//! 3. Only events from the session's pointer mutate it: mouse events for a
//!    mouse session, the tracked identifier for a touch session.
//! 4. The release decision uses the last offset observed by a move event; the
//!    release coordinate is not folded in.
//! 5. A release whose `|offset|` is below `viewport_width * tolerance / 100`
//!    decides [`Direction::Still`].
//!
//! # Sign convention
//!
//! A positive offset drags content right, exposing the *previous* slide, so it
//! maps to [`Direction::Backward`]. Dragging left (negative offset) reveals the
//! next slide.

use crate::event::{
    InputEvent, InputModalities, MousePhase, PointerIdentity, TouchInput, TouchPhase,
};
use crate::navigation::Direction;

/// Per-modality snap tolerances, in percent of the viewport width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTolerance {
    /// Tolerance for mouse drags.
    pub mouse_percent: f64,
    /// Tolerance for touch drags.
    pub touch_percent: f64,
}

impl Default for SnapTolerance {
    fn default() -> Self {
        Self {
            mouse_percent: crate::config::DEFAULT_MOUSE_SNAP_TOLERANCE,
            touch_percent: crate::config::DEFAULT_TOUCH_SNAP_TOLERANCE,
        }
    }
}

impl SnapTolerance {
    /// Tolerance percent for the given pointer.
    #[must_use]
    pub const fn percent_for(&self, identity: PointerIdentity) -> f64 {
        match identity {
            PointerIdentity::Mouse => self.mouse_percent,
            PointerIdentity::Touch(_) => self.touch_percent,
        }
    }

    /// Minimum drag distance in pixels for the given pointer and width.
    #[must_use]
    pub fn threshold_px(&self, identity: PointerIdentity, viewport_width: f64) -> f64 {
        viewport_width * self.percent_for(identity) / 100.0
    }
}

/// An in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    origin_x: f64,
    viewport_width: f64,
    identity: PointerIdentity,
    live_offset: f64,
}

impl DragSession {
    /// Pointer coordinate at drag start.
    #[must_use]
    pub const fn origin_x(&self) -> f64 {
        self.origin_x
    }

    /// Viewport width captured at drag start.
    #[must_use]
    pub const fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// The pointer this session follows.
    #[must_use]
    pub const fn identity(&self) -> PointerIdentity {
        self.identity
    }

    /// Signed distance between the last observed position and the origin.
    #[must_use]
    pub const fn live_offset(&self) -> f64 {
        self.live_offset
    }
}

/// Decision produced when a drag ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRelease {
    /// The pointer that ended.
    pub identity: PointerIdentity,
    /// Final live offset, before the reset to zero.
    pub offset: f64,
    /// Distance the drag had to cover to commit.
    pub threshold_px: f64,
    /// Direction implied by the offset sign alone.
    pub raw_direction: Direction,
    /// Direction after applying the snap tolerance.
    pub direction: Direction,
    /// Whether the release came from a cancel (touch cancel) rather than an end.
    pub cancelled: bool,
}

/// Why an input event did not affect the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureIgnoredReason {
    /// Drag handling for this modality is disabled.
    ModalityDisabled,
    /// A start arrived while a session is already active.
    SessionAlreadyActive,
    /// A move/release arrived with no session.
    NoActiveSession,
    /// Event modality differs from the session's (mouse vs touch).
    ModalityMismatch,
    /// Touch event does not list the tracked identifier.
    PointerMismatch,
    /// Touch start without any touch points.
    NoTouchPoints,
    /// Coordinate is NaN or infinite.
    NonFiniteCoordinate,
}

/// Result of feeding one event to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// A session started for this pointer.
    Started(PointerIdentity),
    /// The live offset changed.
    Moved {
        /// New live offset.
        offset: f64,
    },
    /// The session ended.
    Released(DragRelease),
    /// The event was absorbed without effect.
    Ignored(GestureIgnoredReason),
}

/// Stateful drag tracker.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    enabled: InputModalities,
    tolerance: SnapTolerance,
    session: Option<DragSession>,
}

impl GestureTracker {
    /// Create an idle tracker.
    #[must_use]
    pub const fn new(enabled: InputModalities, tolerance: SnapTolerance) -> Self {
        Self {
            enabled,
            tolerance,
            session: None,
        }
    }

    /// Modalities that may start a session.
    #[must_use]
    pub const fn enabled(&self) -> InputModalities {
        self.enabled
    }

    /// Snap tolerances.
    #[must_use]
    pub const fn tolerance(&self) -> SnapTolerance {
        self.tolerance
    }

    /// The active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Whether a drag is in progress.
    #[inline]
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Current live offset, or zero when idle.
    #[must_use]
    pub fn live_offset(&self) -> f64 {
        self.session.map_or(0.0, |session| session.live_offset)
    }

    /// Feed one input event.
    ///
    /// `viewport_width` is only read when the event starts a session.
    pub fn process(&mut self, event: &InputEvent, viewport_width: f64) -> GestureOutcome {
        match event {
            InputEvent::Mouse(mouse) => match mouse.phase {
                MousePhase::Down => self.begin(PointerIdentity::Mouse, mouse.x, viewport_width),
                MousePhase::Move => self.track(PointerIdentity::Mouse, mouse.x),
                MousePhase::Up => self.release(PointerIdentity::Mouse, false),
            },
            InputEvent::Touch(touch) => match touch.phase {
                TouchPhase::Start => {
                    // Several fingers can land in one event; the first one drives the drag.
                    let Some(first) = touch.touches.first() else {
                        return GestureOutcome::Ignored(GestureIgnoredReason::NoTouchPoints);
                    };
                    self.begin(PointerIdentity::Touch(first.id), first.x, viewport_width)
                }
                TouchPhase::Move => match self.tracked_touch(touch) {
                    Ok((identity, x)) => self.track(identity, x),
                    Err(reason) => GestureOutcome::Ignored(reason),
                },
                TouchPhase::End => match self.tracked_touch(touch) {
                    Ok((identity, _)) => self.release(identity, false),
                    Err(reason) => GestureOutcome::Ignored(reason),
                },
                TouchPhase::Cancel => match self.tracked_touch(touch) {
                    Ok((identity, _)) => self.release(identity, true),
                    Err(reason) => GestureOutcome::Ignored(reason),
                },
            },
        }
    }

    /// Start a session for `identity` at `x`.
    pub fn begin(
        &mut self,
        identity: PointerIdentity,
        x: f64,
        viewport_width: f64,
    ) -> GestureOutcome {
        if !self.enabled.contains(identity.modality()) {
            return GestureOutcome::Ignored(GestureIgnoredReason::ModalityDisabled);
        }
        if self.session.is_some() {
            return GestureOutcome::Ignored(GestureIgnoredReason::SessionAlreadyActive);
        }
        if !x.is_finite() {
            return GestureOutcome::Ignored(GestureIgnoredReason::NonFiniteCoordinate);
        }
        let viewport_width = if viewport_width.is_finite() {
            viewport_width.max(0.0)
        } else {
            0.0
        };
        self.session = Some(DragSession {
            origin_x: x,
            viewport_width,
            identity,
            live_offset: 0.0,
        });
        GestureOutcome::Started(identity)
    }

    /// Update the live offset from a move of `identity` to `x`.
    pub fn track(&mut self, identity: PointerIdentity, x: f64) -> GestureOutcome {
        let session = match self.matching_session(identity) {
            Ok(session) => session,
            Err(reason) => return GestureOutcome::Ignored(reason),
        };
        if !x.is_finite() {
            return GestureOutcome::Ignored(GestureIgnoredReason::NonFiniteCoordinate);
        }
        session.live_offset = x - session.origin_x;
        GestureOutcome::Moved {
            offset: session.live_offset,
        }
    }

    /// End the session for `identity` and produce the direction decision.
    pub fn release(&mut self, identity: PointerIdentity, cancelled: bool) -> GestureOutcome {
        if let Err(reason) = self.matching_session(identity) {
            return GestureOutcome::Ignored(reason);
        }
        let Some(session) = self.session.take() else {
            return GestureOutcome::Ignored(GestureIgnoredReason::NoActiveSession);
        };

        let offset = session.live_offset;
        let raw_direction = Direction::from_drag_offset(offset);
        let threshold_px = self
            .tolerance
            .threshold_px(session.identity, session.viewport_width);
        let direction = if offset.abs() < threshold_px {
            Direction::Still
        } else {
            raw_direction
        };
        GestureOutcome::Released(DragRelease {
            identity: session.identity,
            offset,
            threshold_px,
            raw_direction,
            direction,
            cancelled,
        })
    }

    /// Drop any session without producing a decision.
    pub fn reset(&mut self) -> Option<DragSession> {
        self.session.take()
    }

    /// Locate the tracked touch point in a touch event.
    fn tracked_touch(
        &self,
        touch: &TouchInput,
    ) -> Result<(PointerIdentity, f64), GestureIgnoredReason> {
        let session = self
            .session
            .as_ref()
            .ok_or(GestureIgnoredReason::NoActiveSession)?;
        let PointerIdentity::Touch(tracked) = session.identity else {
            return Err(GestureIgnoredReason::ModalityMismatch);
        };
        touch
            .find(tracked)
            .map(|point| (session.identity, point.x))
            .ok_or(GestureIgnoredReason::PointerMismatch)
    }

    fn matching_session(
        &mut self,
        identity: PointerIdentity,
    ) -> Result<&mut DragSession, GestureIgnoredReason> {
        let session = self
            .session
            .as_mut()
            .ok_or(GestureIgnoredReason::NoActiveSession)?;
        match (session.identity, identity) {
            (PointerIdentity::Mouse, PointerIdentity::Mouse) => Ok(session),
            (PointerIdentity::Touch(a), PointerIdentity::Touch(b)) if a == b => Ok(session),
            (PointerIdentity::Touch(_), PointerIdentity::Touch(_)) => {
                Err(GestureIgnoredReason::PointerMismatch)
            }
            _ => Err(GestureIgnoredReason::ModalityMismatch),
        }
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(InputModalities::all(), SnapTolerance::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
