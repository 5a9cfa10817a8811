#![forbid(unsafe_code)]

//! Deterministic stand-in for a browser host.
//!
//! [`VirtualHost`] executes the [`HostCommand`]s a [`Carousel`] emits against
//! a virtual clock:
//! - frame callbacks fire on the next vsync boundary after they were requested,
//! - the auto-advance interval fires every `period` after it was armed,
//! - input is delivered only while a matching listener is bound, the way a DOM
//!   without a listener never sees the event,
//! - every paint is logged, and a non-CSS strip animation samples the timing
//!   function so the displayed position can be checked between paints.
//!
//! Nothing here reads a real clock, so a script replays identically every run.

use std::fmt;
use std::time::Duration;

use glide_core::{
    Carousel, Dispatch, FrameToken, HostCommand, InputEvent, InputModalities, IntervalToken,
    TimingFunction,
};
use serde::Serialize;

/// 60 Hz refresh.
pub const DEFAULT_VSYNC: Duration = Duration::from_micros(16_667);

/// Callback budget for one [`VirtualHost::advance`] call.
const MAX_CALLBACKS_PER_ADVANCE: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledFrame {
    token: FrameToken,
    due: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArmedInterval {
    token: IntervalToken,
    period: Duration,
    next_due: Duration,
}

/// Displayed strip position, animated between paints.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StripAnimation {
    from_px: f64,
    to_px: f64,
    start: Duration,
    duration: Duration,
    timing: TimingFunction,
}

impl StripAnimation {
    const fn at_rest(px: f64) -> Self {
        Self {
            from_px: px,
            to_px: px,
            start: Duration::ZERO,
            duration: Duration::ZERO,
            timing: TimingFunction::Linear,
        }
    }

    fn position_at(&self, now: Duration) -> f64 {
        if self.duration.is_zero() || now >= self.start + self.duration {
            return self.to_px;
        }
        let elapsed = now.saturating_sub(self.start);
        let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from_px + (self.to_px - self.from_px) * self.timing.sample(progress)
    }
}

/// One applied frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintRecord {
    /// Virtual time of the paint, in milliseconds.
    pub at_ms: f64,
    /// Frame token that painted.
    pub frame: u64,
    /// Committed slide at paint time.
    pub active_slide: usize,
    /// CSS transform applied.
    pub transform: String,
    /// Target translation in pixels.
    pub translate_px: f64,
    /// Whether a drag was in progress.
    pub dragging: bool,
    /// CSS transition applied, absent while dragging.
    pub transition: Option<String>,
}

/// An input event the host had no listener for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedInput {
    /// Virtual time of the drop, in milliseconds.
    pub at_ms: f64,
    /// The event, debug-formatted.
    pub event: String,
}

/// Something the host still holds on the controller's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leak {
    /// Element-level trigger listeners.
    Triggers(InputModalities),
    /// Document-level listeners.
    GlobalListeners(InputModalities),
    /// A requested frame.
    Frame(FrameToken),
    /// An armed interval.
    Interval(IntervalToken),
}

impl fmt::Display for Leak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Triggers(m) => write!(f, "trigger listeners [{}]", modality_names(*m)),
            Self::GlobalListeners(m) => write!(f, "global listeners [{}]", modality_names(*m)),
            Self::Frame(token) => write!(f, "pending {token}"),
            Self::Interval(token) => write!(f, "armed {token}"),
        }
    }
}

/// [`VirtualHost::advance`] hit its callback budget, typically because of a
/// sub-millisecond auto-advance interval over a long stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackOverrun {
    /// Callbacks fired before giving up.
    pub fired: usize,
}

/// Deterministic host for one carousel.
#[derive(Debug, Clone)]
pub struct VirtualHost {
    now: Duration,
    vsync: Duration,
    viewport_width: f64,
    frame: Option<ScheduledFrame>,
    interval: Option<ArmedInterval>,
    triggers: InputModalities,
    globals: InputModalities,
    strip: StripAnimation,
    paints: Vec<PaintRecord>,
    dropped: Vec<DroppedInput>,
    ticks: usize,
}

impl VirtualHost {
    /// Host at time zero with the default vsync.
    #[must_use]
    pub fn new(viewport_width: f64) -> Self {
        Self::with_vsync(viewport_width, DEFAULT_VSYNC)
    }

    /// Host with a custom refresh period. A zero period uses the default.
    #[must_use]
    pub fn with_vsync(viewport_width: f64, vsync: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            vsync: if vsync.is_zero() { DEFAULT_VSYNC } else { vsync },
            viewport_width,
            frame: None,
            interval: None,
            triggers: InputModalities::NONE,
            globals: InputModalities::NONE,
            strip: StripAnimation::at_rest(0.0),
            paints: Vec::new(),
            dropped: Vec::new(),
            ticks: 0,
        }
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Refresh period.
    #[must_use]
    pub const fn vsync(&self) -> Duration {
        self.vsync
    }

    /// Viewport width the host reports.
    #[must_use]
    pub const fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// Every applied frame, in order.
    #[must_use]
    pub fn paints(&self) -> &[PaintRecord] {
        &self.paints
    }

    /// Inputs dropped for lack of a listener.
    #[must_use]
    pub fn dropped(&self) -> &[DroppedInput] {
        &self.dropped
    }

    /// Interval callbacks fired so far.
    #[must_use]
    pub const fn ticks(&self) -> usize {
        self.ticks
    }

    /// Displayed strip translation in pixels at the current time.
    #[must_use]
    pub fn displayed_px(&self) -> f64 {
        self.strip.position_at(self.now)
    }

    /// Mount `carousel` at the host's width and execute the result.
    pub fn mount(&mut self, carousel: &mut Carousel) -> Dispatch {
        let dispatch = carousel.mount(self.viewport_width);
        self.execute(&dispatch.commands);
        dispatch
    }

    /// Change the host width and tell the carousel.
    pub fn resize(&mut self, carousel: &mut Carousel, viewport_width: f64) -> Dispatch {
        self.viewport_width = viewport_width;
        let dispatch = carousel.set_viewport_width(viewport_width);
        self.execute(&dispatch.commands);
        dispatch
    }

    /// Dispose `carousel` and execute the release commands.
    pub fn dispose(&mut self, carousel: &mut Carousel) -> Dispatch {
        let dispatch = carousel.dispose();
        self.execute(&dispatch.commands);
        dispatch
    }

    /// Deliver an input event if a listener for it is bound.
    ///
    /// Starts need a trigger listener; moves and releases need the global
    /// listeners attached for the running drag.
    pub fn deliver(&mut self, carousel: &mut Carousel, event: &InputEvent) -> Option<Dispatch> {
        let modality = event.modality();
        let bound = if event.is_start() {
            self.triggers
        } else {
            self.globals
        };
        if !bound.contains(modality) {
            tracing::debug!(message = "harness.input_dropped", event = ?event, bound = ?bound);
            self.dropped.push(DroppedInput {
                at_ms: millis(self.now),
                event: format!("{event:?}"),
            });
            return None;
        }
        let dispatch = carousel.handle_input(event);
        self.execute(&dispatch.commands);
        Some(dispatch)
    }

    /// Run the virtual clock forward by `dt`, firing due callbacks in time
    /// order. An interval and a frame due at the same instant fire interval
    /// first, so the frame paints the tick's result.
    pub fn advance(
        &mut self,
        carousel: &mut Carousel,
        dt: Duration,
    ) -> Result<usize, CallbackOverrun> {
        let target = self.now.saturating_add(dt);
        let mut fired = 0;
        loop {
            let interval_due = self.interval.map(|i| i.next_due).filter(|&due| due <= target);
            let frame_due = self.frame.map(|f| f.due).filter(|&due| due <= target);
            let fire_interval = match (interval_due, frame_due) {
                (None, None) => break,
                (Some(i), Some(f)) => i <= f,
                (Some(_), None) => true,
                (None, Some(_)) => false,
            };
            if fired >= MAX_CALLBACKS_PER_ADVANCE {
                return Err(CallbackOverrun { fired });
            }
            fired += 1;
            if fire_interval {
                self.fire_interval(carousel);
            } else {
                self.fire_frame(carousel);
            }
        }
        self.now = target;
        Ok(fired)
    }

    /// Apply controller commands to the host's bookkeeping.
    pub fn execute(&mut self, commands: &[HostCommand]) {
        for command in commands {
            match *command {
                HostCommand::BindTrigger(m) => self.triggers |= m,
                HostCommand::UnbindTrigger(m) => self.triggers.remove(m),
                HostCommand::AttachGlobalListeners(m) => self.globals |= m,
                HostCommand::DetachGlobalListeners(m) => self.globals.remove(m),
                HostCommand::RequestFrame(token) => {
                    self.frame = Some(ScheduledFrame {
                        token,
                        due: self.next_vsync(),
                    });
                }
                HostCommand::CancelFrame(token) => {
                    if self.frame.is_some_and(|f| f.token == token) {
                        self.frame = None;
                    }
                }
                HostCommand::ArmInterval { token, period } => {
                    self.interval = Some(ArmedInterval {
                        token,
                        period,
                        next_due: self.now.saturating_add(period),
                    });
                }
                HostCommand::ClearInterval(token) => {
                    if self.interval.is_some_and(|i| i.token == token) {
                        self.interval = None;
                    }
                }
            }
        }
    }

    /// Resources the host still holds for the controller.
    #[must_use]
    pub fn leaks(&self) -> Vec<Leak> {
        let mut leaks = Vec::new();
        if !self.triggers.is_empty() {
            leaks.push(Leak::Triggers(self.triggers));
        }
        if !self.globals.is_empty() {
            leaks.push(Leak::GlobalListeners(self.globals));
        }
        if let Some(frame) = self.frame {
            leaks.push(Leak::Frame(frame.token));
        }
        if let Some(interval) = self.interval {
            leaks.push(Leak::Interval(interval.token));
        }
        leaks
    }

    fn fire_interval(&mut self, carousel: &mut Carousel) {
        let Some(mut armed) = self.interval else {
            return;
        };
        self.now = armed.next_due;
        armed.next_due = armed.next_due.saturating_add(armed.period);
        self.interval = Some(armed);
        self.ticks += 1;
        let dispatch = carousel.on_interval(armed.token);
        self.execute(&dispatch.commands);
    }

    fn fire_frame(&mut self, carousel: &mut Carousel) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        self.now = frame.due;
        let Some(output) = carousel.on_frame(frame.token) else {
            return;
        };
        let target_px = output.transform.translate_px(self.viewport_width);
        self.strip = match output.transition {
            Some(transition) => StripAnimation {
                from_px: self.strip.position_at(self.now),
                to_px: target_px,
                start: self.now,
                duration: transition.duration,
                timing: transition.timing,
            },
            None => StripAnimation::at_rest(target_px),
        };
        self.paints.push(PaintRecord {
            at_ms: millis(self.now),
            frame: frame.token.get(),
            active_slide: carousel.active_slide(),
            transform: output.transform.to_css(),
            translate_px: target_px,
            dragging: output.dragging,
            transition: output.transition.map(|t| t.to_css()),
        });
    }

    /// First vsync boundary strictly after now.
    fn next_vsync(&self) -> Duration {
        let period = self.vsync.as_nanos();
        let next = (self.now.as_nanos() / period + 1) * period;
        Duration::from_nanos(u64::try_from(next).unwrap_or(u64::MAX))
    }
}

fn modality_names(modalities: InputModalities) -> String {
    let mut names = Vec::new();
    if modalities.contains(InputModalities::MOUSE) {
        names.push("mouse");
    }
    if modalities.contains(InputModalities::TOUCH) {
        names.push("touch");
    }
    names.join(", ")
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
