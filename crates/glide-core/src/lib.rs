#![forbid(unsafe_code)]

//! `glide-core` is the drag/snap/auto-advance state machine behind a sliding
//! panel carousel.
//!
//! Design goals:
//! - **Host-driven**: the embedding environment pushes pointer/touch events,
//!   timer ticks and display-refresh callbacks; the core answers with
//!   [`HostCommand`]s and never touches the DOM, a clock or a thread.
//! - **One coherent model**: a committed active slide plus a transient drag
//!   offset, translated into at most one paint per refresh.
//! - **Total**: no operation fails. Inputs that cannot apply come back as a
//!   typed [`IgnoredReason`].
//!
//! ```
//! use glide_core::{Carousel, CarouselConfig, HostCommand, InputEvent};
//!
//! let mut carousel = Carousel::new(5, CarouselConfig::default()).unwrap();
//! carousel.mount(800.0);
//! carousel.handle_input(&InputEvent::mouse_down(400.0));
//! carousel.handle_input(&InputEvent::mouse_move(200.0));
//! let dispatch = carousel.handle_input(&InputEvent::mouse_up(200.0));
//!
//! assert_eq!(carousel.active_slide(), 1);
//! assert!(dispatch
//!     .commands
//!     .iter()
//!     .any(|cmd| matches!(cmd, HostCommand::RequestFrame(_))));
//! ```
//!
//! # Features
//!
//! - `tracing`: structured `carousel.*` debug events.
//! - `input-parser`: [`input_parser::parse_encoded_input`] for JSON-encoded
//!   DOM events.
//! - `config-file`: TOML/JSON loading for [`CarouselConfig`].

pub mod carousel;
pub mod config;
pub mod easing;
pub mod event;
pub mod gesture;
#[cfg(feature = "input-parser")]
pub mod input_parser;
pub mod navigation;
pub mod render;

pub use carousel::{
    Carousel, Dispatch, DispatchOutcome, HostCommand, IgnoredReason, IntervalToken,
};
pub use config::{CarouselConfig, ConfigError};
pub use easing::TimingFunction;
pub use event::{InputEvent, InputModalities, PointerIdentity, TouchPoint};
pub use gesture::{DragRelease, GestureIgnoredReason, GestureOutcome, SnapTolerance};
pub use navigation::{Direction, SlideChange, SlideCount};
pub use render::{FrameOutput, FrameToken, RenderRequest, StripTransform, Transition};
