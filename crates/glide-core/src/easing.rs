#![forbid(unsafe_code)]

//! CSS-compatible timing functions for the settle transition.
//!
//! The carousel does not animate anything itself: the host applies the
//! transition. Browser hosts hand the CSS form straight to `transition`;
//! other hosts (native renderers, the deterministic harness) sample the curve
//! with [`TimingFunction::sample`].
//!
//! # Invariants
//!
//! 1. `sample(0.0) == 0.0` and `sample(1.0) == 1.0` for every function.
//! 2. Input progress is clamped to `[0.0, 1.0]`; NaN is treated as `0.0`.
//! 3. Cubic-bezier x control points are restricted to `[0.0, 1.0]` so the
//!    curve is a function of time (same rule as CSS).

use std::fmt;
use std::str::FromStr;

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 32;
const SOLVE_EPSILON: f64 = 1e-7;

/// A transition timing function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimingFunction {
    /// Constant rate.
    Linear,
    /// `cubic-bezier(0.25, 0.1, 0.25, 1)`.
    Ease,
    /// `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,
    /// `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,
    /// Jump to the end value as soon as progress is non-zero.
    StepStart,
    /// Hold the start value until progress reaches 1.
    StepEnd,
    /// Custom cubic Bézier with endpoints (0,0) and (1,1).
    CubicBezier {
        /// First control point x, in `[0, 1]`.
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x, in `[0, 1]`.
        x2: f64,
        /// Second control point y.
        y2: f64,
    },
}

impl Default for TimingFunction {
    fn default() -> Self {
        Self::Ease
    }
}

/// Error returned when a timing function name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTimingFunction(pub String);

impl fmt::Display for UnknownTimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown timing function: {:?}", self.0)
    }
}

impl std::error::Error for UnknownTimingFunction {}

impl TimingFunction {
    /// Parse a CSS timing function name, returning `None` if unrecognized.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "linear" => Some(Self::Linear),
            "ease" => Some(Self::Ease),
            "ease-in" => Some(Self::EaseIn),
            "ease-out" => Some(Self::EaseOut),
            "ease-in-out" => Some(Self::EaseInOut),
            "step-start" => Some(Self::StepStart),
            "step-end" => Some(Self::StepEnd),
            other => parse_cubic_bezier(other),
        }
    }

    /// Parse a name, falling back to [`TimingFunction::Ease`].
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }

    /// Bézier control points for the curve-shaped functions.
    #[must_use]
    pub const fn control_points(self) -> Option<(f64, f64, f64, f64)> {
        match self {
            Self::Linear => Some((0.0, 0.0, 1.0, 1.0)),
            Self::Ease => Some((0.25, 0.1, 0.25, 1.0)),
            Self::EaseIn => Some((0.42, 0.0, 1.0, 1.0)),
            Self::EaseOut => Some((0.0, 0.0, 0.58, 1.0)),
            Self::EaseInOut => Some((0.42, 0.0, 0.58, 1.0)),
            Self::CubicBezier { x1, y1, x2, y2 } => Some((x1, y1, x2, y2)),
            Self::StepStart | Self::StepEnd => None,
        }
    }

    /// Eased progress for linear progress `t`.
    #[must_use]
    pub fn sample(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match self {
            Self::Linear => t,
            Self::StepStart => 1.0,
            Self::StepEnd => 0.0,
            curve => {
                let Some((x1, y1, x2, y2)) = curve.control_points() else {
                    return t;
                };
                let s = solve_curve_x(x1, x2, t);
                bezier(y1, y2, s)
            }
        }
    }
}

impl FromStr for TimingFunction {
    type Err = UnknownTimingFunction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownTimingFunction(s.to_string()))
    }
}

impl fmt::Display for TimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Ease => f.write_str("ease"),
            Self::EaseIn => f.write_str("ease-in"),
            Self::EaseOut => f.write_str("ease-out"),
            Self::EaseInOut => f.write_str("ease-in-out"),
            Self::StepStart => f.write_str("step-start"),
            Self::StepEnd => f.write_str("step-end"),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

fn parse_cubic_bezier(name: &str) -> Option<TimingFunction> {
    let args = name
        .strip_prefix("cubic-bezier")?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let mut values = [0.0_f64; 4];
    let mut parts = args.split(',');
    for slot in &mut values {
        let value: f64 = parts.next()?.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        *slot = value;
    }
    if parts.next().is_some() {
        return None;
    }
    let [x1, y1, x2, y2] = values;
    if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
        return None;
    }
    Some(TimingFunction::CubicBezier { x1, y1, x2, y2 })
}

/// One coordinate of a cubic Bézier with endpoints 0 and 1.
fn bezier(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_derivative(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Find the curve parameter whose x coordinate equals `x`.
///
/// Newton's method converges quickly for typical curves; bisection covers
/// flat derivatives.
fn solve_curve_x(x1: f64, x2: f64, x: f64) -> f64 {
    let mut s = x;
    for _ in 0..NEWTON_ITERATIONS {
        let err = bezier(x1, x2, s) - x;
        if err.abs() < SOLVE_EPSILON {
            return s;
        }
        let slope = bezier_derivative(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    for _ in 0..BISECTION_ITERATIONS {
        let value = bezier(x1, x2, s);
        if (value - x).abs() < SOLVE_EPSILON {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TimingFunction; 8] = [
        TimingFunction::Linear,
        TimingFunction::Ease,
        TimingFunction::EaseIn,
        TimingFunction::EaseOut,
        TimingFunction::EaseInOut,
        TimingFunction::StepStart,
        TimingFunction::StepEnd,
        TimingFunction::CubicBezier {
            x1: 0.1,
            y1: 1.4,
            x2: 0.9,
            y2: -0.4,
        },
    ];

    #[test]
    fn endpoints_are_fixed() {
        for f in ALL {
            assert_eq!(f.sample(0.0), 0.0, "{f}");
            assert_eq!(f.sample(1.0), 1.0, "{f}");
        }
    }

    #[test]
    fn progress_is_clamped() {
        for f in ALL {
            assert_eq!(f.sample(-3.0), 0.0, "{f}");
            assert_eq!(f.sample(7.0), 1.0, "{f}");
            assert_eq!(f.sample(f64::NAN), 0.0, "{f}");
        }
    }

    #[test]
    fn linear_is_identity() {
        for i in 1..10 {
            let t = f64::from(i) / 10.0;
            assert!((TimingFunction::Linear.sample(t) - t).abs() < 1e-12);
        }
    }

    #[test]
    fn ease_is_monotonic_and_front_loaded() {
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = TimingFunction::Ease.sample(f64::from(i) / 100.0);
            assert!(v >= prev - 1e-9, "ease must not go backwards");
            prev = v;
        }
        // ease accelerates early: halfway in time is well past halfway in value.
        assert!(TimingFunction::Ease.sample(0.5) > 0.75);
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        let f = TimingFunction::EaseInOut;
        for i in 1..10 {
            let t = f64::from(i) / 10.0;
            assert!((f.sample(t) + f.sample(1.0 - t) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn steps_jump_at_the_edges() {
        assert_eq!(TimingFunction::StepStart.sample(0.01), 1.0);
        assert_eq!(TimingFunction::StepEnd.sample(0.99), 0.0);
    }

    #[test]
    fn parses_keywords_case_insensitively() {
        assert_eq!(TimingFunction::parse("EASE-in"), Some(TimingFunction::EaseIn));
        assert_eq!(
            TimingFunction::parse("  linear "),
            Some(TimingFunction::Linear)
        );
        assert_eq!(TimingFunction::parse("bouncy"), None);
    }

    #[test]
    fn parses_cubic_bezier() {
        assert_eq!(
            TimingFunction::parse("cubic-bezier(0.1, 0.7, 1.0, 0.1)"),
            Some(TimingFunction::CubicBezier {
                x1: 0.1,
                y1: 0.7,
                x2: 1.0,
                y2: 0.1
            })
        );
        assert_eq!(TimingFunction::parse("cubic-bezier(1.2, 0, 0, 1)"), None);
        assert_eq!(TimingFunction::parse("cubic-bezier(0, 0, 1)"), None);
        assert_eq!(TimingFunction::parse("cubic-bezier(0, 0, 1, 1, 1)"), None);
        assert_eq!(TimingFunction::parse("cubic-bezier(0, nan, 1, 1)"), None);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for f in ALL {
            assert_eq!(TimingFunction::parse(&f.to_string()), Some(f));
        }
    }

    #[test]
    fn from_str_reports_unknown_name() {
        let err = "springy".parse::<TimingFunction>().unwrap_err();
        assert_eq!(err, UnknownTimingFunction("springy".into()));
        assert!(err.to_string().contains("springy"));
        assert_eq!(
            TimingFunction::parse_or_default("springy"),
            TimingFunction::Ease
        );
    }
}
