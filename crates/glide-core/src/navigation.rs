#![forbid(unsafe_code)]

//! Committed navigation state: the active slide and the remembered direction.
//!
//! # Invariants
//!
//! 1. `active_slide` is always in `[0, N-1]`; out-of-range moves clamp.
//! 2. [`NavigationState::advance`] with [`Direction::Still`] changes nothing,
//!    not even the remembered direction.
//! 3. A non-still advance records its direction even when clamped at an edge.
//! 4. Auto-advance bounces between the first and last slide; it never wraps.

use std::num::NonZeroUsize;

/// Movement direction along the slide strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Towards slide 0.
    Backward,
    /// No movement.
    #[default]
    Still,
    /// Towards slide N-1.
    Forward,
}

impl Direction {
    /// Direction implied by a drag offset.
    ///
    /// Positive offsets pull the strip right and reveal the previous slide.
    #[must_use]
    pub fn from_drag_offset(offset: f64) -> Self {
        if offset > 0.0 {
            Self::Backward
        } else if offset < 0.0 {
            Self::Forward
        } else {
            Self::Still
        }
    }

    /// Signed step: -1, 0 or +1.
    #[must_use]
    pub const fn step(self) -> i8 {
        match self {
            Self::Backward => -1,
            Self::Still => 0,
            Self::Forward => 1,
        }
    }

    /// Opposite direction; `Still` stays `Still`.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Backward => Self::Forward,
            Self::Still => Self::Still,
            Self::Forward => Self::Backward,
        }
    }

    /// Whether this is [`Direction::Still`].
    #[must_use]
    pub const fn is_still(self) -> bool {
        matches!(self, Self::Still)
    }
}

/// Number of panels; always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlideCount(NonZeroUsize);

impl SlideCount {
    /// `None` for zero panels.
    #[must_use]
    pub const fn new(count: usize) -> Option<Self> {
        match NonZeroUsize::new(count) {
            Some(count) => Some(Self(count)),
            None => None,
        }
    }

    /// Count the panels of a collection.
    #[must_use]
    pub fn from_panels<I: IntoIterator>(panels: I) -> Option<Self> {
        Self::new(panels.into_iter().count())
    }

    /// The count.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Index of the last slide.
    #[must_use]
    pub const fn last_index(self) -> usize {
        self.0.get() - 1
    }

    /// Clamp a signed index into `[0, N-1]`.
    #[must_use]
    pub fn clamp(self, index: i64) -> usize {
        let last = i64::try_from(self.last_index()).unwrap_or(i64::MAX);
        // Both bounds fit in usize, so the conversion cannot fail.
        usize::try_from(index.clamp(0, last)).unwrap_or(0)
    }
}

/// What one navigation step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideChange {
    /// Active slide before the step.
    pub from: usize,
    /// Active slide after the step.
    pub to: usize,
    /// Direction applied.
    pub direction: Direction,
}

impl SlideChange {
    /// Whether the active slide changed.
    #[must_use]
    pub const fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// Active slide plus remembered travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    count: SlideCount,
    active: usize,
    direction: Direction,
}

impl NavigationState {
    /// Start at slide 0 with the given remembered direction.
    #[must_use]
    pub const fn new(count: SlideCount, direction: Direction) -> Self {
        Self {
            count,
            active: 0,
            direction,
        }
    }

    /// The committed slide.
    #[inline]
    #[must_use]
    pub const fn active_slide(&self) -> usize {
        self.active
    }

    /// The remembered direction.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of slides.
    #[must_use]
    pub const fn slide_count(&self) -> SlideCount {
        self.count
    }

    /// Apply a drag-commit decision.
    ///
    /// `Still` is a no-op and keeps the remembered direction so a cancelled
    /// drag does not stall auto-advance.
    pub fn advance(&mut self, direction: Direction) -> SlideChange {
        let from = self.active;
        if !direction.is_still() {
            self.active = self.step_target(direction);
            self.direction = direction;
        }
        SlideChange {
            from,
            to: self.active,
            direction,
        }
    }

    /// Apply one auto-advance tick, bouncing off both ends.
    ///
    /// Returns `None` for a single-slide carousel, which has nowhere to go.
    pub fn auto_advance(&mut self) -> Option<SlideChange> {
        if self.count.get() < 2 {
            return None;
        }
        let mut direction = match self.direction {
            Direction::Still => Direction::Forward,
            other => other,
        };
        let target = self.active as i64 + i64::from(direction.step());
        if target < 0 || target > self.count.last_index() as i64 {
            direction = direction.reversed();
        }
        Some(self.advance(direction))
    }

    fn step_target(&self, direction: Direction) -> usize {
        self.count
            .clamp(self.active as i64 + i64::from(direction.step()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(count: usize) -> NavigationState {
        NavigationState::new(SlideCount::new(count).expect("non-zero"), Direction::Forward)
    }

    #[test]
    fn zero_panels_have_no_count() {
        assert!(SlideCount::new(0).is_none());
        assert!(SlideCount::from_panels(Vec::<&str>::new()).is_none());
        assert_eq!(SlideCount::from_panels(["a", "b", "c"]).map(SlideCount::get), Some(3));
    }

    #[test]
    fn direction_from_offset_inverts_sign() {
        assert_eq!(Direction::from_drag_offset(12.0), Direction::Backward);
        assert_eq!(Direction::from_drag_offset(-0.5), Direction::Forward);
        assert_eq!(Direction::from_drag_offset(0.0), Direction::Still);
        assert_eq!(Direction::from_drag_offset(f64::NAN), Direction::Still);
    }

    #[test]
    fn direction_steps_and_reversal() {
        assert_eq!(Direction::Backward.step(), -1);
        assert_eq!(Direction::Still.step(), 0);
        assert_eq!(Direction::Forward.step(), 1);
        assert_eq!(Direction::Forward.reversed(), Direction::Backward);
        assert_eq!(Direction::Still.reversed(), Direction::Still);
    }

    #[test]
    fn advance_moves_and_records_direction() {
        let mut n = nav(5);
        let change = n.advance(Direction::Forward);
        assert!(change.moved());
        assert_eq!((change.from, change.to), (0, 1));
        assert_eq!(n.active_slide(), 1);
        n.advance(Direction::Backward);
        assert_eq!(n.active_slide(), 0);
        assert_eq!(n.direction(), Direction::Backward);
    }

    #[test]
    fn advance_still_preserves_direction() {
        let mut n = nav(5);
        n.advance(Direction::Backward);
        let change = n.advance(Direction::Still);
        assert!(!change.moved());
        assert_eq!(n.direction(), Direction::Backward);
    }

    #[test]
    fn advance_clamps_but_records_attempted_direction() {
        let mut n = nav(3);
        n.advance(Direction::Forward);
        n.advance(Direction::Forward);
        n.advance(Direction::Backward);
        n.advance(Direction::Forward);
        let change = n.advance(Direction::Forward);
        assert_eq!(n.active_slide(), 2);
        assert!(!change.moved());
        assert_eq!(n.direction(), Direction::Forward);

        let mut n = nav(3);
        n.advance(Direction::Backward);
        assert_eq!(n.active_slide(), 0);
        assert_eq!(n.direction(), Direction::Backward);
    }

    #[test]
    fn auto_advance_bounces_at_last_slide() {
        let mut n = nav(5);
        for _ in 0..4 {
            n.auto_advance();
        }
        assert_eq!(n.active_slide(), 4);
        assert_eq!(n.direction(), Direction::Forward);
        let change = n.auto_advance().expect("multi-slide");
        assert_eq!(change.to, 3);
        assert_eq!(n.direction(), Direction::Backward);
    }

    #[test]
    fn auto_advance_bounces_at_first_slide() {
        let mut n = nav(3);
        n.advance(Direction::Backward);
        assert_eq!(n.direction(), Direction::Backward);
        let change = n.auto_advance().expect("multi-slide");
        assert_eq!((change.from, change.to), (0, 1));
        assert_eq!(n.direction(), Direction::Forward);
    }

    #[test]
    fn auto_advance_two_slides_oscillates() {
        let mut n = nav(2);
        let visited: Vec<usize> = (0..6)
            .map(|_| n.auto_advance().expect("two slides").to)
            .collect();
        assert_eq!(visited, vec![1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn auto_advance_single_slide_is_noop() {
        let mut n = nav(1);
        assert!(n.auto_advance().is_none());
        assert_eq!(n.active_slide(), 0);
    }

    #[test]
    fn auto_advance_from_still_goes_forward() {
        let mut n = NavigationState::new(SlideCount::new(4).expect("non-zero"), Direction::Still);
        let change = n.auto_advance().expect("multi-slide");
        assert_eq!(change.to, 1);
        assert_eq!(n.direction(), Direction::Forward);
    }

    #[test]
    fn clamp_handles_extremes() {
        let count = SlideCount::new(4).expect("non-zero");
        assert_eq!(count.clamp(-100), 0);
        assert_eq!(count.clamp(2), 2);
        assert_eq!(count.clamp(i64::MAX), 3);
    }
}
