#![forbid(unsafe_code)]

//! JSON input parser for host-encoded DOM pointer and touch events.
//!
//! Browser hosts forward the events their listeners receive as small JSON
//! records:
//!
//! ```json
//! {"kind":"mouse","phase":"down","x":412.5}
//! {"kind":"touch","phase":"move","touches":[{"id":3,"x":120.0}]}
//! ```
//!
//! [`parse_encoded_input`] turns such a record into an [`InputEvent`].
//! Kinds the carousel does not react to (`wheel`, `key`, `focus`, ...) parse to
//! `Ok(None)` so hosts can forward their whole event stream unfiltered.
//!
//! Only the horizontal coordinate matters for the carousel; `y` and any other
//! extra fields are accepted and ignored.

use serde::Deserialize;

use crate::event::{InputEvent, MouseInput, MousePhase, TouchInput, TouchPhase, TouchPoint};

/// Errors from parsing encoded input JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Unknown phase value for the event kind.
    UnknownPhase(String),
}

impl core::fmt::Display for InputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownPhase(phase) => write!(f, "unknown phase: {phase}"),
        }
    }
}

impl std::error::Error for InputParseError {}

#[derive(Debug, Deserialize)]
struct RawInput {
    kind: String,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    touches: Option<Vec<RawTouch>>,
}

#[derive(Debug, Deserialize)]
struct RawTouch {
    id: u32,
    x: f64,
}

/// Parse one JSON-encoded input record.
///
/// Returns `Ok(None)` for kinds without a carousel mapping and `Err` for
/// malformed JSON, missing fields or unknown phases.
pub fn parse_encoded_input(json: &str) -> Result<Option<InputEvent>, InputParseError> {
    let raw: RawInput =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;
    convert(raw)
}

/// Parse an already-decoded JSON value, e.g. one embedded in a larger document.
pub fn parse_input_value(value: &serde_json::Value) -> Result<Option<InputEvent>, InputParseError> {
    let raw = RawInput::deserialize(value).map_err(|e| InputParseError::Json(e.to_string()))?;
    convert(raw)
}

fn convert(raw: RawInput) -> Result<Option<InputEvent>, InputParseError> {
    match raw.kind.as_str() {
        "mouse" => parse_mouse(&raw).map(Some),
        "touch" => parse_touch(raw).map(Some),
        _ => Ok(None),
    }
}

fn parse_mouse(raw: &RawInput) -> Result<InputEvent, InputParseError> {
    let phase = raw
        .phase
        .as_deref()
        .ok_or(InputParseError::MissingField("phase"))?;
    let phase = match phase {
        "down" => MousePhase::Down,
        "move" => MousePhase::Move,
        "up" => MousePhase::Up,
        other => return Err(InputParseError::UnknownPhase(other.to_string())),
    };
    let x = raw.x.ok_or(InputParseError::MissingField("x"))?;
    Ok(InputEvent::Mouse(MouseInput { phase, x }))
}

fn parse_touch(raw: RawInput) -> Result<InputEvent, InputParseError> {
    let phase = raw
        .phase
        .as_deref()
        .ok_or(InputParseError::MissingField("phase"))?;
    let phase = match phase {
        "start" => TouchPhase::Start,
        "move" => TouchPhase::Move,
        "end" => TouchPhase::End,
        "cancel" => TouchPhase::Cancel,
        other => return Err(InputParseError::UnknownPhase(other.to_string())),
    };
    let touches = raw
        .touches
        .ok_or(InputParseError::MissingField("touches"))?
        .into_iter()
        .map(|t| TouchPoint::new(t.id, t.x))
        .collect();
    Ok(InputEvent::Touch(TouchInput { phase, touches }))
}
