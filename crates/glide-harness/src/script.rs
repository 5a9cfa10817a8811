#![forbid(unsafe_code)]

//! JSON scenario scripts replayed through a [`VirtualHost`].
//!
//! ```json
//! {
//!   "slides": 5,
//!   "viewportWidth": 800,
//!   "config": { "autoSlideIntervalMs": 0 },
//!   "steps": [
//!     { "input": { "kind": "mouse", "phase": "down", "x": 400 } },
//!     { "input": { "kind": "mouse", "phase": "move", "x": 200 } },
//!     { "advance": 20 },
//!     { "input": { "kind": "mouse", "phase": "up", "x": 200 } },
//!     { "advance": 600 },
//!     "dispose"
//!   ]
//! }
//! ```
//!
//! `advance` runs the virtual clock in milliseconds; `resize` changes the
//! viewport width; `input` carries one host-encoded event record.

use std::path::Path;
use std::time::Duration;

use glide_core::input_parser::parse_input_value;
use glide_core::{Carousel, CarouselConfig, ConfigError, DispatchOutcome};
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::virtual_host::{DroppedInput, PaintRecord, VirtualHost};

fn default_viewport_width() -> f64 {
    800.0
}

/// A replayable scenario.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Script {
    /// Number of panels.
    pub slides: usize,
    /// Host viewport width at mount, in pixels.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    /// Refresh period in milliseconds; defaults to 60 Hz.
    #[serde(default)]
    pub vsync_ms: Option<f64>,
    /// Carousel options; missing keys take defaults.
    #[serde(default)]
    pub config: Option<CarouselConfig>,
    /// Steps, executed in order.
    pub steps: Vec<Step>,
}

/// One script step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    /// Deliver one encoded input record.
    Input(serde_json::Value),
    /// Run the clock forward by this many milliseconds.
    Advance(f64),
    /// Change the viewport width.
    Resize(f64),
    /// Dispose the carousel.
    Dispose,
}

impl Script {
    /// Parse a script from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a script file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarnessError::MissingPath {
                path: path.to_path_buf(),
            });
        }
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

/// Controller state after the last step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalState {
    pub active_slide: usize,
    pub direction: String,
    pub dragging: bool,
    pub disposed: bool,
    /// Strip translation the host displays at the end of the script.
    pub displayed_px: f64,
}

/// A step the controller did not act on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IgnoredStep {
    pub step: usize,
    pub reason: String,
}

/// Everything observed while replaying a script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptReport {
    /// `false` when the script has no slides and nothing was built.
    pub rendered: bool,
    pub slides: usize,
    pub final_state: Option<FinalState>,
    pub paints: Vec<PaintRecord>,
    pub dropped: Vec<DroppedInput>,
    pub ignored: Vec<IgnoredStep>,
    /// Input records of kinds the carousel does not react to.
    pub unmapped_inputs: usize,
    pub commits: usize,
    pub ticks: usize,
    /// Resources still held after dispose; empty when the script never
    /// disposes.
    pub leaks: Vec<String>,
    pub elapsed_ms: f64,
}

impl ScriptReport {
    fn empty(slides: usize) -> Self {
        Self {
            rendered: false,
            slides,
            final_state: None,
            paints: Vec::new(),
            dropped: Vec::new(),
            ignored: Vec::new(),
            unmapped_inputs: 0,
            commits: 0,
            ticks: 0,
            leaks: Vec::new(),
            elapsed_ms: 0.0,
        }
    }
}

/// Replay `script`, with `config` taking precedence over the script's own.
pub fn run_script(script: &Script, config: Option<CarouselConfig>) -> Result<ScriptReport> {
    let config = config
        .or_else(|| script.config.clone())
        .unwrap_or_default();
    let problems = config.validate();
    if !problems.is_empty() {
        return Err(HarnessError::Config(ConfigError::Validation(problems)));
    }
    let vsync = match script.vsync_ms {
        Some(ms) => millis_to_duration(ms, "vsyncMs")?,
        None => crate::virtual_host::DEFAULT_VSYNC,
    };

    let Some(mut carousel) = Carousel::new(script.slides, config) else {
        tracing::info!(message = "harness.empty_script", steps = script.steps.len());
        return Ok(ScriptReport::empty(script.slides));
    };
    let mut host = VirtualHost::with_vsync(script.viewport_width, vsync);
    host.mount(&mut carousel);

    let mut report = ScriptReport::empty(script.slides);
    report.rendered = true;

    for (index, step) in script.steps.iter().enumerate() {
        let outcome = match step {
            Step::Input(value) => {
                let event = parse_input_value(value)
                    .map_err(|source| HarnessError::Input { step: index, source })?;
                let Some(event) = event else {
                    report.unmapped_inputs += 1;
                    continue;
                };
                match host.deliver(&mut carousel, &event) {
                    Some(dispatch) => dispatch.outcome,
                    None => continue,
                }
            }
            Step::Advance(ms) => {
                let dt = millis_to_duration(*ms, "advance")?;
                host.advance(&mut carousel, dt).map_err(|overrun| {
                    HarnessError::invalid(format!(
                        "step {index}: advance fired {} callbacks without settling",
                        overrun.fired
                    ))
                })?;
                continue;
            }
            Step::Resize(width) => host.resize(&mut carousel, *width).outcome,
            Step::Dispose => host.dispose(&mut carousel).outcome,
        };

        match outcome {
            DispatchOutcome::Committed { .. } => report.commits += 1,
            DispatchOutcome::Ignored(reason) => report.ignored.push(IgnoredStep {
                step: index,
                reason: format!("{reason:?}"),
            }),
            _ => {}
        }
    }

    report.final_state = Some(FinalState {
        active_slide: carousel.active_slide(),
        direction: format!("{:?}", carousel.direction()),
        dragging: carousel.is_dragging(),
        disposed: carousel.is_disposed(),
        displayed_px: host.displayed_px(),
    });
    report.paints = host.paints().to_vec();
    report.dropped = host.dropped().to_vec();
    report.ticks = host.ticks();
    report.elapsed_ms = host.now().as_secs_f64() * 1000.0;
    if carousel.is_disposed() {
        report.leaks = host.leaks().iter().map(ToString::to_string).collect();
    }

    tracing::info!(
        message = "harness.script_done",
        steps = script.steps.len(),
        paints = report.paints.len(),
        commits = report.commits,
        leaks = report.leaks.len(),
    );
    Ok(report)
}

fn millis_to_duration(ms: f64, field: &str) -> Result<Duration> {
    if !ms.is_finite() || ms < 0.0 {
        return Err(HarnessError::invalid(format!(
            "{field} must be a finite, non-negative number of milliseconds, got {ms}"
        )));
    }
    Duration::try_from_secs_f64(ms / 1000.0)
        .map_err(|e| HarnessError::invalid(format!("{field}: {e}")))
}
