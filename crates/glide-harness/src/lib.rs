#![forbid(unsafe_code)]

//! Deterministic host and scenario runner for `glide-core`.
//!
//! Replays JSON scripts of pointer/touch input, clock advances and resizes
//! through a [`virtual_host::VirtualHost`] and reports what was painted,
//! what was dropped and what the host still holds after disposal.

pub mod cli;
pub mod error;
pub mod logging;
pub mod script;
pub mod virtual_host;

pub use cli::{run, run_from_env};
pub use error::{HarnessError, Result};
pub use script::{Script, ScriptReport, Step, run_script};
pub use virtual_host::{Leak, VirtualHost};
