//! # Suntrack Library
//!
//! Adaptive sun phase and position tracking for a single observer.
//!
//! The library splits the work into layers:
//!
//! - **Solar model** (`solar`): location, phase classification, brightness,
//!   the event horizon scan and the bundled SPA provider
//! - **Scheduling** (`scheduler`): the adaptive two-chain scheduler, its timer
//!   queue, snapshot sinks and the runtime loop
//! - **Configuration** (`config`): TOML settings with validation and defaults
//! - **Infrastructure**: logging, time source, signals and CLI parsing

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

pub mod app;
pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod signals;
pub mod solar;
pub mod time;

pub use app::Suntrack;
pub use error::{SunError, SunResult};
pub use scheduler::AdaptiveScheduler;
pub use solar::{Location, Phase, SolarSnapshot};
