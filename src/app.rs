//! Application coordinator: sets up logging, signals, configuration and the
//! scheduler, then hands control to the runtime loop.
//!
//! ```no_run
//! use suntrack::Suntrack;
//!
//! # fn main() -> anyhow::Result<()> {
//! // Normal startup, decorated log output
//! Suntrack::new(false).run()?;
//!
//! // Machine-readable output, one JSON object per update
//! Suntrack::new(false).json_output(true).run()?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};

use crate::common::logger::Log;
use crate::config;
use crate::error::SunError;
use crate::scheduler::runtime::{Runtime, StopReason};
use crate::scheduler::{AdaptiveScheduler, JsonLinesSink, LogSink, SnapshotSink, TimerQueue};
use crate::signals::setup_signal_handler;
use crate::solar::SpaProvider;
use crate::time::source;

/// Builder for running the tracker.
pub struct Suntrack {
    debug_enabled: bool,
    json_output: bool,
    show_headers: bool,
}

impl Suntrack {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            json_output: false,
            show_headers: true,
        }
    }

    /// Publish JSON lines on stdout instead of log blocks.
    pub fn json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    /// Skip the version header (the caller already printed one).
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Track the sun until a shutdown signal or the end of a simulation.
    pub fn run(self) -> Result<()> {
        Log::set_debug_enabled(self.debug_enabled);
        if self.show_headers {
            log_version!();
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Debug mode enabled - showing scheduling decisions");
            }
        }

        let signal_state = setup_signal_handler()?;

        let config_path = config::get_config_path()?;
        let config = config::load_or_create(&config_path)?;
        log_block_start!("Loaded configuration from {}", config_path.display());
        config.log_config();

        let location = config.location()?;

        let sink: Box<dyn SnapshotSink> = if self.json_output {
            // Keep stdout clean for the JSON stream.
            Log::set_enabled(false);
            Box::new(JsonLinesSink::new(std::io::stdout()))
        } else {
            Box::new(LogSink::new())
        };

        let mut scheduler = AdaptiveScheduler::new(
            SpaProvider::new(),
            TimerQueue::new(),
            sink,
            config.scheduler_settings(),
        );
        scheduler
            .start(location, source::now())
            .with_context(|| format!("Failed to start tracking with {}", config_path.display()))?;

        let mut runtime = Runtime::new(scheduler, signal_state).with_config_path(config_path);
        let reason = runtime.run()?;

        Log::set_enabled(true);
        match reason {
            StopReason::Signal => log_block_start!("Shutdown requested, timers cancelled"),
            StopReason::SimulationEnded => log_block_start!("Simulation complete"),
            StopReason::Idle => log_block_start!("Nothing left to track"),
        }
        log_end!();
        Ok(())
    }
}

/// True when `err` is, or wraps, a missing or invalid configuration.
pub fn is_configuration_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<SunError>(),
            Some(SunError::Configuration(_))
        )
    })
}
