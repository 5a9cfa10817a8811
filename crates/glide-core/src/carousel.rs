#![forbid(unsafe_code)]

//! Host-driven carousel controller.
//!
//! [`Carousel`] glues the gesture tracker, the navigation state and the
//! render driver together. It never calls into its host: every handler returns
//! a [`Dispatch`] whose [`HostCommand`]s the host executes in order (bind DOM
//! listeners, request animation frames, arm the auto-advance interval). Frame
//! and interval callbacks come back through [`Carousel::on_frame`] and
//! [`Carousel::on_interval`] carrying the token they were scheduled with.
//!
//! # Lifecycle
//!
//! ```text
//!   Created ──mount──▶ Mounted ──dispose──▶ Disposed
//!      └──────────────dispose─────────────────▲
//! ```
//!
//! # Invariants
//!
//! 1. `active_slide` changes only on a drag commit or an auto-advance tick.
//! 2. The auto-advance interval is never armed while a drag is active; it is
//!    cleared on drag start and re-armed on release.
//! 3. Global move/up listeners are attached on drag start and detached on
//!    release for the same modality, so attach/detach commands always pair.
//! 4. At most one frame and at most one interval are outstanding.
//! 5. After [`Carousel::dispose`] every handler is a no-op and the host holds
//!    no listener, frame or interval issued by this controller.
//!
//! # Failure Modes
//!
//! Nothing fails. Inputs that cannot apply are reported as
//! [`DispatchOutcome::Ignored`] with a typed [`IgnoredReason`]; stale frame and
//! interval tokens are dropped silently.

use std::fmt;
use std::time::Duration;

use crate::config::CarouselConfig;
use crate::event::{InputEvent, InputModalities, PointerIdentity};
use crate::gesture::{DragRelease, GestureIgnoredReason, GestureOutcome, GestureTracker};
use crate::navigation::{Direction, NavigationState, SlideChange, SlideCount};
use crate::render::{FrameOutput, FrameToken, RenderDriver, RenderRequest, Transition};

// ---------------------------------------------------------------------------
// Host protocol
// ---------------------------------------------------------------------------

/// Handle for one armed auto-advance interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalToken(u64);

impl IntervalToken {
    /// Rebuild a token from the raw value a host handed back.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value, for hosts that key timers by integer.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IntervalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interval#{}", self.0)
    }
}

/// Side effect the host must perform on the controller's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Bind element-level drag triggers (mouse-down / touch-start).
    BindTrigger(InputModalities),
    /// Unbind element-level drag triggers.
    UnbindTrigger(InputModalities),
    /// Attach document-level move/up (touch move/end/cancel) listeners.
    AttachGlobalListeners(InputModalities),
    /// Detach document-level listeners.
    DetachGlobalListeners(InputModalities),
    /// Schedule a display-refresh callback.
    RequestFrame(FrameToken),
    /// Cancel a scheduled display-refresh callback.
    CancelFrame(FrameToken),
    /// Start a recurring timer that calls back with `token` every `period`.
    ArmInterval {
        /// Token passed back on each tick.
        token: IntervalToken,
        /// Tick period.
        period: Duration,
    },
    /// Stop a recurring timer.
    ClearInterval(IntervalToken),
}

/// Why the controller did not act on a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// The controller has been disposed.
    Disposed,
    /// Input arrived before [`Carousel::mount`].
    NotMounted,
    /// [`Carousel::mount`] was called twice.
    AlreadyMounted,
    /// The gesture tracker rejected the event.
    Gesture(GestureIgnoredReason),
    /// Interval tick for a token that is no longer armed.
    StaleInterval,
    /// Interval tick while a drag is active.
    DragInProgress,
    /// Auto-advance tick with fewer than two slides.
    NothingToAdvance,
}

/// What one controller call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DispatchOutcome {
    /// Triggers bound and first paint scheduled.
    Mounted,
    /// A drag session started.
    DragStarted(PointerIdentity),
    /// The live offset changed.
    DragMoved {
        /// New live offset.
        offset: f64,
    },
    /// A drag ended and its decision was applied.
    Committed {
        /// The release decision.
        release: DragRelease,
        /// The resulting navigation step.
        change: SlideChange,
    },
    /// An auto-advance tick moved the carousel.
    AutoAdvanced(SlideChange),
    /// The viewport width was updated.
    Resized,
    /// Everything was released.
    Disposed,
    /// Nothing happened.
    Ignored(IgnoredReason),
}

/// Result of one controller call.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    /// What happened.
    pub outcome: DispatchOutcome,
    /// Host commands to execute, in order.
    pub commands: Vec<HostCommand>,
}

impl Dispatch {
    fn ignored(reason: IgnoredReason) -> Self {
        Self {
            outcome: DispatchOutcome::Ignored(reason),
            commands: Vec::new(),
        }
    }

    /// The ignored reason, if the call had no effect.
    #[must_use]
    pub fn ignored_reason(&self) -> Option<IgnoredReason> {
        match self.outcome {
            DispatchOutcome::Ignored(reason) => Some(reason),
            _ => None,
        }
    }

    /// The navigation step taken, if any.
    #[must_use]
    pub fn slide_change(&self) -> Option<SlideChange> {
        match self.outcome {
            DispatchOutcome::Committed { change, .. } | DispatchOutcome::AutoAdvanced(change) => {
                Some(change)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    Disposed,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drag/snap/auto-advance carousel controller.
#[derive(Debug, Clone)]
pub struct Carousel {
    config: CarouselConfig,
    navigation: NavigationState,
    gesture: GestureTracker,
    render: RenderDriver,
    auto_interval: Option<Duration>,
    viewport_width: f64,
    lifecycle: Lifecycle,
    triggers: InputModalities,
    global_listeners: InputModalities,
    interval: Option<IntervalToken>,
    next_interval: u64,
}

impl Carousel {
    /// Create a controller for `count` panels.
    ///
    /// Returns `None` when there are no panels: an empty carousel renders
    /// nothing and needs no state machine.
    #[must_use]
    pub fn new(count: usize, config: CarouselConfig) -> Option<Self> {
        SlideCount::new(count).map(|count| Self::with_slide_count(count, config))
    }

    /// Create a controller for a known non-zero slide count.
    #[must_use]
    pub fn with_slide_count(count: SlideCount, config: CarouselConfig) -> Self {
        let auto_interval = config.auto_slide_interval();
        let initial_direction = if auto_interval.is_some() {
            Direction::Forward
        } else {
            Direction::Still
        };
        let transition = Transition {
            duration: config.transition_duration(),
            timing: config.timing_function(),
        };
        Self {
            navigation: NavigationState::new(count, initial_direction),
            gesture: GestureTracker::new(config.enabled_modalities(), config.snap_tolerance()),
            render: RenderDriver::new(transition),
            auto_interval,
            viewport_width: 0.0,
            lifecycle: Lifecycle::Created,
            triggers: InputModalities::NONE,
            global_listeners: InputModalities::NONE,
            interval: None,
            next_interval: 1,
            config,
        }
    }

    // --- accessors -------------------------------------------------------

    /// The committed slide.
    #[inline]
    #[must_use]
    pub const fn active_slide(&self) -> usize {
        self.navigation.active_slide()
    }

    /// Remembered travel direction.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.navigation.direction()
    }

    /// Whether a drag is in progress.
    #[inline]
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    /// Live drag offset, zero when idle.
    #[must_use]
    pub fn live_offset(&self) -> f64 {
        self.gesture.live_offset()
    }

    /// Number of slides.
    #[must_use]
    pub const fn slide_count(&self) -> usize {
        self.navigation.slide_count().get()
    }

    /// What the next frame would paint.
    #[must_use]
    pub fn render_request(&self) -> RenderRequest {
        RenderRequest {
            active_slide: self.active_slide(),
            live_offset: self.live_offset(),
            dragging: self.is_dragging(),
        }
    }

    /// Whether [`Carousel::dispose`] has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.lifecycle == Lifecycle::Disposed
    }

    /// The configuration this controller was built with.
    #[must_use]
    pub const fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Current viewport width in pixels.
    #[must_use]
    pub const fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// Auto-advance period, `None` when disabled.
    #[must_use]
    pub const fn auto_interval(&self) -> Option<Duration> {
        self.auto_interval
    }

    /// The armed interval, if any.
    #[must_use]
    pub const fn interval_token(&self) -> Option<IntervalToken> {
        self.interval
    }

    /// The unfired frame, if any.
    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.render.pending_token()
    }

    /// Trigger listeners the host currently holds for this controller.
    #[must_use]
    pub const fn bound_triggers(&self) -> InputModalities {
        self.triggers
    }

    /// Global listeners the host currently holds for this controller.
    #[must_use]
    pub const fn global_listeners(&self) -> InputModalities {
        self.global_listeners
    }

    /// Paint statistics from the render driver.
    #[must_use]
    pub const fn render_driver(&self) -> &RenderDriver {
        &self.render
    }

    // --- handlers --------------------------------------------------------

    /// Attach to the host: bind triggers, arm auto-advance, paint once.
    pub fn mount(&mut self, viewport_width: f64) -> Dispatch {
        match self.lifecycle {
            Lifecycle::Disposed => return Dispatch::ignored(IgnoredReason::Disposed),
            Lifecycle::Mounted => return Dispatch::ignored(IgnoredReason::AlreadyMounted),
            Lifecycle::Created => {}
        }
        self.lifecycle = Lifecycle::Mounted;
        self.viewport_width = sanitize_width(viewport_width);

        let mut commands = Vec::new();
        let enabled = self.gesture.enabled();
        if !enabled.is_empty() {
            self.triggers = enabled;
            commands.push(HostCommand::BindTrigger(enabled));
        }
        self.arm_interval(&mut commands);
        self.schedule_paint(&mut commands);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "carousel.mount",
            slides = self.slide_count(),
            viewport_width = self.viewport_width,
            auto_interval_ms = self.auto_interval.map(|d| d.as_secs_f64() * 1000.0),
            triggers = ?self.triggers,
        );

        Dispatch {
            outcome: DispatchOutcome::Mounted,
            commands,
        }
    }

    /// Feed one pointer or touch event.
    pub fn handle_input(&mut self, event: &InputEvent) -> Dispatch {
        match self.lifecycle {
            Lifecycle::Disposed => return Dispatch::ignored(IgnoredReason::Disposed),
            Lifecycle::Created => return Dispatch::ignored(IgnoredReason::NotMounted),
            Lifecycle::Mounted => {}
        }

        let mut commands = Vec::new();
        let outcome = match self.gesture.process(event, self.viewport_width) {
            GestureOutcome::Started(identity) => {
                self.clear_interval(&mut commands);
                self.attach_global(identity.modality(), &mut commands);
                self.schedule_paint(&mut commands);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    message = "carousel.drag_start",
                    pointer = ?identity,
                    viewport_width = self.viewport_width,
                );
                DispatchOutcome::DragStarted(identity)
            }
            GestureOutcome::Moved { offset } => {
                self.schedule_paint(&mut commands);
                DispatchOutcome::DragMoved { offset }
            }
            GestureOutcome::Released(release) => {
                self.detach_global(release.identity.modality(), &mut commands);
                let change = self.navigation.advance(release.direction);
                self.schedule_paint(&mut commands);
                self.arm_interval(&mut commands);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    message = "carousel.commit",
                    from = change.from,
                    to = change.to,
                    decision = ?release.direction,
                    offset = release.offset,
                    threshold_px = release.threshold_px,
                    cancelled = release.cancelled,
                );
                DispatchOutcome::Committed { release, change }
            }
            GestureOutcome::Ignored(reason) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(message = "carousel.input_ignored", reason = ?reason);
                DispatchOutcome::Ignored(IgnoredReason::Gesture(reason))
            }
        };

        Dispatch { outcome, commands }
    }

    /// Record a new viewport width.
    ///
    /// A running drag keeps the width it captured at start.
    pub fn set_viewport_width(&mut self, viewport_width: f64) -> Dispatch {
        if self.is_disposed() {
            return Dispatch::ignored(IgnoredReason::Disposed);
        }
        self.viewport_width = sanitize_width(viewport_width);
        Dispatch {
            outcome: DispatchOutcome::Resized,
            commands: Vec::new(),
        }
    }

    /// Auto-advance timer callback.
    pub fn on_interval(&mut self, token: IntervalToken) -> Dispatch {
        if self.is_disposed() {
            return Dispatch::ignored(IgnoredReason::Disposed);
        }
        if self.interval != Some(token) {
            return Dispatch::ignored(IgnoredReason::StaleInterval);
        }
        if self.is_dragging() {
            return Dispatch::ignored(IgnoredReason::DragInProgress);
        }
        let Some(change) = self.navigation.auto_advance() else {
            return Dispatch::ignored(IgnoredReason::NothingToAdvance);
        };

        let mut commands = Vec::new();
        self.schedule_paint(&mut commands);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "carousel.auto_advance",
            from = change.from,
            to = change.to,
            direction = ?change.direction,
        );
        Dispatch {
            outcome: DispatchOutcome::AutoAdvanced(change),
            commands,
        }
    }

    /// Display-refresh callback. Returns what to paint, or `None` for a
    /// stale token.
    pub fn on_frame(&mut self, token: FrameToken) -> Option<FrameOutput> {
        if self.is_disposed() {
            return None;
        }
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!(
            "carousel.frame",
            token = token.get(),
            painted = tracing::field::Empty
        );
        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        let output = self.render.on_frame(token);

        #[cfg(feature = "tracing")]
        span.record("painted", output.is_some());
        output
    }

    /// Release every listener, the pending frame and the interval.
    pub fn dispose(&mut self) -> Dispatch {
        if self.is_disposed() {
            return Dispatch::ignored(IgnoredReason::Disposed);
        }
        let mut commands = Vec::new();
        self.gesture.reset();
        if !self.global_listeners.is_empty() {
            commands.push(HostCommand::DetachGlobalListeners(self.global_listeners));
            self.global_listeners = InputModalities::NONE;
        }
        if !self.triggers.is_empty() {
            commands.push(HostCommand::UnbindTrigger(self.triggers));
            self.triggers = InputModalities::NONE;
        }
        if let Some(frame) = self.render.cancel() {
            commands.push(HostCommand::CancelFrame(frame));
        }
        self.clear_interval(&mut commands);
        self.lifecycle = Lifecycle::Disposed;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "carousel.dispose",
            active_slide = self.active_slide(),
            released = commands.len(),
        );

        Dispatch {
            outcome: DispatchOutcome::Disposed,
            commands,
        }
    }

    // --- internals -------------------------------------------------------

    fn schedule_paint(&mut self, commands: &mut Vec<HostCommand>) {
        let schedule = self.render.request(self.render_request());
        if let Some(stale) = schedule.cancel {
            commands.push(HostCommand::CancelFrame(stale));
        }
        commands.push(HostCommand::RequestFrame(schedule.request));
    }

    fn arm_interval(&mut self, commands: &mut Vec<HostCommand>) {
        if self.interval.is_some() || self.is_dragging() || self.slide_count() < 2 {
            return;
        }
        let Some(period) = self.auto_interval else {
            return;
        };
        let token = IntervalToken(self.next_interval);
        self.next_interval = self.next_interval.saturating_add(1);
        self.interval = Some(token);
        commands.push(HostCommand::ArmInterval { token, period });
    }

    fn clear_interval(&mut self, commands: &mut Vec<HostCommand>) {
        if let Some(token) = self.interval.take() {
            commands.push(HostCommand::ClearInterval(token));
        }
    }

    fn attach_global(&mut self, modality: InputModalities, commands: &mut Vec<HostCommand>) {
        self.global_listeners |= modality;
        commands.push(HostCommand::AttachGlobalListeners(modality));
    }

    fn detach_global(&mut self, modality: InputModalities, commands: &mut Vec<HostCommand>) {
        if self.global_listeners.contains(modality) {
            self.global_listeners.remove(modality);
            commands.push(HostCommand::DetachGlobalListeners(modality));
        }
    }
}

fn sanitize_width(width: f64) -> f64 {
    if width.is_finite() { width.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::TimingFunction;
    use pretty_assertions::assert_eq;

    fn mounted(count: usize, config: CarouselConfig, width: f64) -> Carousel {
        let mut carousel = Carousel::new(count, config).expect("non-empty");
        carousel.mount(width);
        carousel
    }

    fn interval(carousel: &Carousel) -> IntervalToken {
        carousel.interval_token().expect("interval armed")
    }

    fn no_auto() -> CarouselConfig {
        CarouselConfig {
            auto_slide_interval_ms: 0.0,
            ..CarouselConfig::default()
        }
    }

    #[test]
    fn zero_panels_build_nothing() {
        assert!(Carousel::new(0, CarouselConfig::default()).is_none());
    }

    #[test]
    fn mount_binds_triggers_arms_interval_and_paints() {
        let mut c = Carousel::new(5, CarouselConfig::default()).expect("non-empty");
        let d = c.mount(800.0);
        assert_eq!(d.outcome, DispatchOutcome::Mounted);
        assert_eq!(
            d.commands,
            vec![
                HostCommand::BindTrigger(InputModalities::MOUSE | InputModalities::TOUCH),
                HostCommand::ArmInterval {
                    token: IntervalToken(1),
                    period: Duration::from_millis(1500),
                },
                HostCommand::RequestFrame(FrameToken::from_raw(1)),
            ]
        );
        assert_eq!(c.direction(), Direction::Forward);
    }

    #[test]
    fn mount_twice_is_ignored() {
        let mut c = mounted(3, CarouselConfig::default(), 800.0);
        let d = c.mount(800.0);
        assert_eq!(d.ignored_reason(), Some(IgnoredReason::AlreadyMounted));
        assert!(d.commands.is_empty());
    }

    #[test]
    fn input_before_mount_is_ignored() {
        let mut c = Carousel::new(3, CarouselConfig::default()).expect("non-empty");
        let d = c.handle_input(&InputEvent::mouse_down(10.0));
        assert_eq!(d.ignored_reason(), Some(IgnoredReason::NotMounted));
        assert!(!c.is_dragging());
    }

    #[test]
    fn disabled_auto_advance_never_arms() {
        for ms in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let config = CarouselConfig {
                auto_slide_interval_ms: ms,
                ..CarouselConfig::default()
            };
            let mut c = Carousel::new(5, config).expect("non-empty");
            let d = c.mount(800.0);
            assert!(
                !d.commands
                    .iter()
                    .any(|cmd| matches!(cmd, HostCommand::ArmInterval { .. })),
                "interval {ms} must not arm"
            );
            assert_eq!(c.direction(), Direction::Still);
        }
    }

    #[test]
    fn single_slide_never_arms_interval() {
        let c = mounted(1, CarouselConfig::default(), 800.0);
        assert!(c.interval_token().is_none());
    }

    #[test]
    fn no_enabled_modality_binds_no_trigger() {
        let config = CarouselConfig {
            enable_mouse_handling: false,
            enable_touch_handling: false,
            ..no_auto()
        };
        let mut c = Carousel::new(3, config).expect("non-empty");
        let d = c.mount(800.0);
        assert_eq!(d.commands, vec![HostCommand::RequestFrame(FrameToken::from_raw(1))]);
        let d = c.handle_input(&InputEvent::mouse_down(5.0));
        assert_eq!(
            d.ignored_reason(),
            Some(IgnoredReason::Gesture(GestureIgnoredReason::ModalityDisabled))
        );
    }

    #[test]
    fn first_tick_moves_to_slide_one() {
        let mut c = mounted(5, CarouselConfig::default(), 800.0);
        let token = interval(&c);
        let d = c.on_interval(token);
        let change = d.slide_change().expect("advanced");
        assert_eq!((change.from, change.to), (0, 1));
        assert_eq!(c.active_slide(), 1);
    }

    #[test]
    fn auto_advance_bounces_off_last_slide() {
        let mut c = mounted(3, CarouselConfig::default(), 800.0);
        let token = interval(&c);
        let visited: Vec<usize> = (0..6)
            .map(|_| {
                c.on_interval(token);
                c.active_slide()
            })
            .collect();
        assert_eq!(visited, vec![1, 2, 1, 0, 1, 2]);
    }

    #[test]
    fn mouse_drag_below_tolerance_keeps_slide() {
        let mut c = mounted(5, no_auto(), 800.0);
        c.handle_input(&InputEvent::mouse_down(400.0));
        c.handle_input(&InputEvent::mouse_move(350.0));
        let d = c.handle_input(&InputEvent::mouse_up(350.0));
        let change = d.slide_change().expect("committed");
        assert!(!change.moved());
        assert_eq!(c.active_slide(), 0);
        assert_eq!(c.live_offset(), 0.0);
        assert!(!c.is_dragging());
    }

    #[test]
    fn mouse_drag_beyond_tolerance_advances() {
        let mut c = mounted(5, no_auto(), 800.0);
        c.handle_input(&InputEvent::mouse_down(400.0));
        c.handle_input(&InputEvent::mouse_move(200.0));
        let d = c.handle_input(&InputEvent::mouse_up(200.0));
        assert_eq!(c.active_slide(), 1);
        assert_eq!(c.direction(), Direction::Forward);
        match d.outcome {
            DispatchOutcome::Committed { release, .. } => {
                assert_eq!(release.offset, -200.0);
                assert_eq!(release.threshold_px, 160.0);
            }
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn sub_tolerance_drag_preserves_direction() {
        let mut c = mounted(5, no_auto(), 800.0);
        c.handle_input(&InputEvent::mouse_down(100.0));
        c.handle_input(&InputEvent::mouse_move(0.0));
        c.handle_input(&InputEvent::mouse_up(0.0));
        c.handle_input(&InputEvent::mouse_down(100.0));
        c.handle_input(&InputEvent::mouse_move(400.0));
        c.handle_input(&InputEvent::mouse_up(400.0));
        assert_eq!(c.active_slide(), 0);
        assert_eq!(c.direction(), Direction::Backward);

        c.handle_input(&InputEvent::mouse_down(100.0));
        c.handle_input(&InputEvent::mouse_move(110.0));
        c.handle_input(&InputEvent::mouse_up(110.0));
        assert_eq!(c.direction(), Direction::Backward);
    }

    #[test]
    fn drag_clears_and_rearms_interval() {
        let mut c = mounted(5, CarouselConfig::default(), 800.0);
        let first = interval(&c);
        c.on_frame(FrameToken::from_raw(1));

        let d = c.handle_input(&InputEvent::mouse_down(400.0));
        assert_eq!(
            d.commands,
            vec![
                HostCommand::ClearInterval(first),
                HostCommand::AttachGlobalListeners(InputModalities::MOUSE),
                HostCommand::RequestFrame(FrameToken::from_raw(2)),
            ]
        );
        assert!(c.interval_token().is_none());
        assert_eq!(
            c.on_interval(first).ignored_reason(),
            Some(IgnoredReason::StaleInterval)
        );

        c.on_frame(FrameToken::from_raw(2));
        let d = c.handle_input(&InputEvent::mouse_up(400.0));
        let second = interval(&c);
        assert_ne!(first, second);
        assert_eq!(
            d.commands,
            vec![
                HostCommand::DetachGlobalListeners(InputModalities::MOUSE),
                HostCommand::RequestFrame(FrameToken::from_raw(3)),
                HostCommand::ArmInterval {
                    token: second,
                    period: Duration::from_millis(1500),
                },
            ]
        );
    }

    #[test]
    fn second_drag_start_is_ignored() {
        let mut c = mounted(5, no_auto(), 800.0);
        c.handle_input(&InputEvent::mouse_down(400.0));
        let d = c.handle_input(&InputEvent::touch_start(7, 10.0));
        assert_eq!(
            d.ignored_reason(),
            Some(IgnoredReason::Gesture(
                GestureIgnoredReason::SessionAlreadyActive
            ))
        );
        assert_eq!(c.global_listeners(), InputModalities::MOUSE);
    }

    #[test]
    fn touch_end_for_other_finger_keeps_session() {
        let mut c = mounted(5, no_auto(), 800.0);
        c.handle_input(&InputEvent::touch_start(1, 400.0));
        c.handle_input(&InputEvent::touch_move(1, 250.0));
        let d = c.handle_input(&InputEvent::touch_end(2, 250.0));
        assert!(d.ignored_reason().is_some());
        assert!(c.is_dragging());
        c.handle_input(&InputEvent::touch_end(1, 250.0));
        assert_eq!(c.active_slide(), 1);
        assert_eq!(c.global_listeners(), InputModalities::NONE);
    }

    #[test]
    fn moves_coalesce_into_one_frame() {
        let mut c = mounted(5, no_auto(), 800.0);
        c.handle_input(&InputEvent::mouse_down(400.0));
        for x in [390.0, 380.0, 370.0] {
            c.handle_input(&InputEvent::mouse_move(x));
        }
        let pending = c.pending_frame().expect("frame pending");
        assert!(c.on_frame(FrameToken::from_raw(1)).is_none());
        let out = c.on_frame(pending).expect("latest frame paints");
        assert!(out.dragging);
        assert!(out.transition.is_none());
        assert_eq!(out.transform.offset_px, -30.0);
        assert_eq!(c.render_driver().frames_painted(), 1);
    }

    #[test]
    fn released_frame_carries_configured_transition() {
        let config = CarouselConfig {
            transition_speed_ms: 250,
            transition_timing_function: "ease-in-out".into(),
            ..no_auto()
        };
        let mut c = mounted(3, config, 600.0);
        let out = c.on_frame(FrameToken::from_raw(1)).expect("mount frame");
        let transition = out.transition.expect("idle frames animate");
        assert_eq!(transition.duration, Duration::from_millis(250));
        assert_eq!(transition.timing, TimingFunction::EaseInOut);
    }

    #[test]
    fn resize_does_not_affect_running_session() {
        let mut c = mounted(5, no_auto(), 800.0);
        c.handle_input(&InputEvent::mouse_down(400.0));
        c.set_viewport_width(200.0);
        c.handle_input(&InputEvent::mouse_move(300.0));
        c.handle_input(&InputEvent::mouse_up(300.0));
        // 100px of 800 is below the 20% threshold captured at start.
        assert_eq!(c.active_slide(), 0);
        assert_eq!(c.viewport_width(), 200.0);
    }

    #[test]
    fn dispose_releases_everything_mid_drag() {
        let mut c = mounted(5, CarouselConfig::default(), 800.0);
        let token = interval(&c);
        c.handle_input(&InputEvent::touch_start(3, 400.0));
        let pending = c.pending_frame().expect("frame pending");
        let d = c.dispose();
        assert_eq!(
            d.commands,
            vec![
                HostCommand::DetachGlobalListeners(InputModalities::TOUCH),
                HostCommand::UnbindTrigger(InputModalities::MOUSE | InputModalities::TOUCH),
                HostCommand::CancelFrame(pending),
            ]
        );
        assert!(c.is_disposed());
        assert!(!c.is_dragging());
        assert_eq!(c.bound_triggers(), InputModalities::NONE);
        assert!(c.on_frame(pending).is_none());
        assert_eq!(
            c.on_interval(token).ignored_reason(),
            Some(IgnoredReason::Disposed)
        );
    }

    #[test]
    fn dispose_clears_armed_interval() {
        let mut c = mounted(5, CarouselConfig::default(), 800.0);
        let token = interval(&c);
        c.on_frame(FrameToken::from_raw(1));
        let d = c.dispose();
        assert_eq!(
            d.commands,
            vec![
                HostCommand::UnbindTrigger(InputModalities::MOUSE | InputModalities::TOUCH),
                HostCommand::ClearInterval(token),
            ]
        );
    }

    #[test]
    fn everything_after_dispose_is_noop() {
        let mut c = mounted(5, CarouselConfig::default(), 800.0);
        c.dispose();
        assert_eq!(c.dispose().ignored_reason(), Some(IgnoredReason::Disposed));
        assert_eq!(c.mount(800.0).ignored_reason(), Some(IgnoredReason::Disposed));
        assert_eq!(
            c.handle_input(&InputEvent::mouse_down(1.0)).ignored_reason(),
            Some(IgnoredReason::Disposed)
        );
        assert_eq!(
            c.set_viewport_width(10.0).ignored_reason(),
            Some(IgnoredReason::Disposed)
        );
    }

    #[test]
    fn dispose_before_mount_emits_nothing() {
        let mut c = Carousel::new(2, CarouselConfig::default()).expect("non-empty");
        let d = c.dispose();
        assert_eq!(d.outcome, DispatchOutcome::Disposed);
        assert!(d.commands.is_empty());
    }

    #[test]
    fn degenerate_width_commits_on_any_movement() {
        let mut c = mounted(5, no_auto(), f64::NAN);
        assert_eq!(c.viewport_width(), 0.0);
        c.handle_input(&InputEvent::mouse_down(100.0));
        c.handle_input(&InputEvent::mouse_move(99.0));
        c.handle_input(&InputEvent::mouse_up(99.0));
        // Zero width means a zero threshold, so any movement commits.
        assert_eq!(c.active_slide(), 1);
    }

    #[cfg(feature = "tracing")]
    mod tracing_capture {
        use super::*;
        use pretty_assertions::assert_eq;
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::layer::{Context, SubscriberExt};

        #[derive(Default)]
        struct Captured {
            messages: Vec<String>,
            frame_spans: usize,
        }

        struct CarouselTraceCapture {
            state: Arc<Mutex<Captured>>,
        }

        impl<S> tracing_subscriber::Layer<S> for CarouselTraceCapture
        where
            S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
        {
            fn on_new_span(
                &self,
                attrs: &tracing::span::Attributes<'_>,
                _id: &tracing::span::Id,
                _ctx: Context<'_, S>,
            ) {
                if attrs.metadata().name() == "carousel.frame" {
                    self.state.lock().expect("trace lock").frame_spans += 1;
                }
            }

            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                struct Msg {
                    message: Option<String>,
                }
                impl tracing::field::Visit for Msg {
                    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                        if field.name() == "message" {
                            self.message = Some(value.to_string());
                        }
                    }

                    fn record_debug(
                        &mut self,
                        field: &tracing::field::Field,
                        value: &dyn std::fmt::Debug,
                    ) {
                        if field.name() == "message" {
                            self.message =
                                Some(format!("{value:?}").trim_matches('"').to_string());
                        }
                    }
                }
                let mut msg = Msg { message: None };
                event.record(&mut msg);
                if let Some(message) = msg.message {
                    self.state.lock().expect("trace lock").messages.push(message);
                }
            }
        }

        #[test]
        fn lifecycle_events_are_traced() {
            let state = Arc::new(Mutex::new(Captured::default()));
            let subscriber = tracing_subscriber::registry().with(CarouselTraceCapture {
                state: Arc::clone(&state),
            });
            let _guard = tracing::subscriber::set_default(subscriber);

            let mut c = Carousel::new(3, CarouselConfig::default()).expect("non-empty");
            c.mount(800.0);
            c.on_frame(FrameToken::from_raw(1));
            let token = interval(&c);
            c.on_interval(token);
            c.handle_input(&InputEvent::mouse_move(5.0));
            c.handle_input(&InputEvent::mouse_down(400.0));
            c.handle_input(&InputEvent::mouse_move(100.0));
            c.handle_input(&InputEvent::mouse_up(100.0));
            c.dispose();

            let snapshot = state.lock().expect("trace lock");
            for expected in [
                "carousel.mount",
                "carousel.auto_advance",
                "carousel.input_ignored",
                "carousel.drag_start",
                "carousel.commit",
                "carousel.dispose",
            ] {
                assert!(
                    snapshot.messages.iter().any(|m| m == expected),
                    "missing {expected} in {:?}",
                    snapshot.messages
                );
            }
            assert_eq!(snapshot.frame_spans, 1);
        }
    }
}
