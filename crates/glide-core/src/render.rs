#![forbid(unsafe_code)]

//! Frame-coalesced paint scheduling for the slide strip.
//!
//! Pointer moves arrive far more often than the display refreshes. The
//! [`RenderDriver`] keeps at most one outstanding frame request: each new
//! [`RenderRequest`] cancels the unfired frame and schedules a fresh one, and
//! only the frame that is still pending when the host's refresh callback fires
//! produces a [`FrameOutput`].
//!
//! Only the paint is coalesced. The logical offset lives in the gesture
//! tracker and sees every move.
//!
//! # Invariants
//!
//! 1. At most one frame token is pending at any time.
//! 2. A token that was cancelled (or already fired) never paints.
//! 3. `transition` is `None` exactly when the request was made mid-drag, so
//!    the strip tracks the pointer 1:1 and animates the settle on release.

use std::fmt;
use std::time::Duration;

use crate::easing::TimingFunction;

/// Handle for one scheduled display-refresh callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(u64);

impl FrameToken {
    /// Rebuild a token from the raw value a host handed back.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value, for hosts that key callbacks by integer.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Position to paint: committed slide plus live drag offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    /// Committed slide index.
    pub active_slide: usize,
    /// Live drag offset in pixels (zero when idle).
    pub live_offset: f64,
    /// Whether a drag is in progress.
    pub dragging: bool,
}

/// Strip translation: `-100% x active_slide` plus the live offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripTransform {
    /// Translation as a percentage of the viewport width.
    pub slide_percent: f64,
    /// Additional translation in pixels.
    pub offset_px: f64,
}

impl StripTransform {
    /// Transform for a request.
    #[must_use]
    pub fn for_request(request: &RenderRequest) -> Self {
        Self {
            // Subtracting from +0.0 keeps slide 0 from rendering as "-0%".
            slide_percent: 0.0 - 100.0 * request.active_slide as f64,
            offset_px: request.live_offset,
        }
    }

    /// CSS `transform` value.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "translateX({}%) translateX({}px)",
            self.slide_percent, self.offset_px
        )
    }

    /// Total translation in pixels for hosts without percentage units.
    #[must_use]
    pub fn translate_px(&self, viewport_width: f64) -> f64 {
        self.slide_percent / 100.0 * viewport_width + self.offset_px
    }
}

/// Settle/auto-advance animation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Animation duration.
    pub duration: Duration,
    /// Easing curve.
    pub timing: TimingFunction,
}

impl Transition {
    /// CSS `transition` value.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!("all {}ms {}", self.duration.as_millis(), self.timing)
    }
}

/// Everything the host applies when a frame fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    /// The frame that produced this output.
    pub token: FrameToken,
    /// Strip translation.
    pub transform: StripTransform,
    /// Whether a drag is in progress (the host suppresses transitions).
    pub dragging: bool,
    /// Transition to apply, `None` while dragging.
    pub transition: Option<Transition>,
}

/// Frame scheduling changes produced by one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSchedule {
    /// Unfired frame to cancel first.
    pub cancel: Option<FrameToken>,
    /// Frame to request.
    pub request: FrameToken,
}

/// Coalesces render requests into at most one paint per refresh.
#[derive(Debug, Clone)]
pub struct RenderDriver {
    transition: Transition,
    pending: Option<(FrameToken, RenderRequest)>,
    next_token: u64,
    frames_painted: u64,
    requests_superseded: u64,
}

impl RenderDriver {
    /// Create a driver with no pending frame.
    #[must_use]
    pub const fn new(transition: Transition) -> Self {
        Self {
            transition,
            pending: None,
            next_token: 1,
            frames_painted: 0,
            requests_superseded: 0,
        }
    }

    /// Schedule a paint of `request`, superseding any unfired frame.
    pub fn request(&mut self, request: RenderRequest) -> FrameSchedule {
        let cancel = self.pending.take().map(|(token, _)| token);
        if cancel.is_some() {
            self.requests_superseded = self.requests_superseded.saturating_add(1);
        }
        let token = self.next_token();
        self.pending = Some((token, request));
        FrameSchedule {
            cancel,
            request: token,
        }
    }

    /// Display-refresh callback for `token`.
    ///
    /// Returns `None` for stale tokens.
    pub fn on_frame(&mut self, token: FrameToken) -> Option<FrameOutput> {
        let (pending, request) = self.pending?;
        if pending != token {
            return None;
        }
        self.pending = None;
        self.frames_painted = self.frames_painted.saturating_add(1);
        Some(FrameOutput {
            token,
            transform: StripTransform::for_request(&request),
            dragging: request.dragging,
            transition: (!request.dragging).then_some(self.transition),
        })
    }

    /// Drop the pending frame, returning its token for cancellation.
    pub fn cancel(&mut self) -> Option<FrameToken> {
        self.pending.take().map(|(token, _)| token)
    }

    /// Token of the unfired frame, if any.
    #[must_use]
    pub fn pending_token(&self) -> Option<FrameToken> {
        self.pending.map(|(token, _)| token)
    }

    /// Transition applied when not dragging.
    #[must_use]
    pub const fn transition(&self) -> Transition {
        self.transition
    }

    /// Frames that produced output.
    #[must_use]
    pub const fn frames_painted(&self) -> u64 {
        self.frames_painted
    }

    /// Requests that replaced an unfired frame.
    #[must_use]
    pub const fn requests_superseded(&self) -> u64 {
        self.requests_superseded
    }

    fn next_token(&mut self) -> FrameToken {
        let token = FrameToken(self.next_token);
        self.next_token = self.next_token.saturating_add(1);
        token
    }
}
