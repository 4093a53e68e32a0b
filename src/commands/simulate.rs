//! `suntrack simulate`: run the tracker over a simulated UTC window.
//!
//! The process clock is replaced before anything reads it, so every timer,
//! log timestamp and published instant follows simulated time.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::app::Suntrack;
use crate::time::source::{self, SimulatedTimeSource};

/// Validated simulation window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub multiplier: f64,
}

impl SimulationWindow {
    pub fn parse(start_time: &str, end_time: &str, multiplier: f64) -> Result<Self> {
        let start = source::parse_datetime(start_time)
            .map_err(|e| anyhow::anyhow!("Invalid start time: {}", e))?;
        let end = source::parse_datetime(end_time)
            .map_err(|e| anyhow::anyhow!("Invalid end time: {}", e))?;
        if end <= start {
            anyhow::bail!("End time must be after start time");
        }
        Ok(Self {
            start,
            end,
            multiplier,
        })
    }
}

pub fn handle_simulate_command(
    start_time: &str,
    end_time: &str,
    multiplier: f64,
    debug_enabled: bool,
    json_output: bool,
) -> Result<()> {
    let window = SimulationWindow::parse(start_time, end_time, multiplier)?;

    source::init_time_source(Arc::new(SimulatedTimeSource::new(
        window.start,
        window.end,
        window.multiplier,
    )));

    log_version!();
    log_block_start!("Simulation Mode");
    log_indented!("From: {}", window.start.format("%Y-%m-%d %H:%M:%S UTC"));
    log_indented!("To:   {}", window.end.format("%Y-%m-%d %H:%M:%S UTC"));
    if window.multiplier == 0.0 {
        log_indented!("Speed: fast-forward");
    } else {
        log_indented!("Speed: {}x", window.multiplier);
    }

    Suntrack::new(debug_enabled)
        .json_output(json_output)
        .without_headers()
        .run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_parse() {
        let window =
            SimulationWindow::parse("2020-06-21 00:00:00", "2020-06-22 00:00:00", 0.0).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2020, 6, 21, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2020, 6, 22, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_rejects_reversed_range() {
        assert!(SimulationWindow::parse("2020-06-22 00:00:00", "2020-06-21 00:00:00", 0.0).is_err());
        assert!(SimulationWindow::parse("yesterday", "2020-06-21 00:00:00", 0.0).is_err());
    }
}
