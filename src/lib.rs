//! Keyboard teleoperation for a mobile robot
//!
//! Keys read from a raw-mode terminal are mapped to twist-style velocity
//! commands and published on the `cmd_vel` topic.
//!
//! The [`Terminal`] interface switches the controlling terminal into raw,
//! non-echoing mode and reads input one byte at a time. Shutdown signals
//! are reported as events rather than handled asynchronously, so the caller
//! restores the terminal on every exit path.
//!
//! The [`command`] module holds the static key table. [`Teleop`] ties the
//! two together with a [`Publisher`] sink.
//!
//! ## Keys
//!
//! | Key | Action |
//! |---|---|
//! | Up / Down | increase / decrease the speed scale by `0.1` |
//! | `w` / `s` | forward / backward |
//! | `a` / `d` | rotate counter-clockwise / clockwise |
//! | `q` / `e` | curve left / right |
//! | space | stop |
//!
//! [`Terminal`]: terminal/struct.Terminal.html
//! [`command`]: command/index.html
//! [`Teleop`]: teleop/struct.Teleop.html
//! [`Publisher`]: publish/trait.Publisher.html

#![deny(missing_docs)]

#[cfg(not(unix))]
compile_error!("key_teleop requires a Unix terminal");

pub use crate::command::{Action, Effect, ScaleFactors, Twist, Vector3};
pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::publish::{Publisher, SinkTarget, TOPIC};
pub use crate::signal::{Signal, SignalSet};
pub use crate::teleop::{Shutdown, Teleop};
pub use crate::terminal::{Event, PrepareConfig, PrepareState, Terminal};

pub mod command;
pub mod config;
pub mod error;
pub mod publish;
pub mod signal;
pub mod teleop;
pub mod terminal;

#[cfg(unix)]
#[path = "unix/mod.rs"]
mod sys;
