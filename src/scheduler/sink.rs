//! Destinations for published snapshots.

use anyhow::{Context, Result};
use std::io::Write;

use crate::solar::phase::Phase;
use crate::solar::snapshot::SolarSnapshot;

/// Receives every snapshot the scheduler publishes.
pub trait SnapshotSink {
    fn publish(&mut self, snapshot: &SolarSnapshot) -> Result<()>;
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for Box<S> {
    fn publish(&mut self, snapshot: &SolarSnapshot) -> Result<()> {
        (**self).publish(snapshot)
    }
}

/// Publishes through the logger: a block on every phase change, a decorated
/// line for each position update.
#[derive(Debug, Default)]
pub struct LogSink {
    last_phase: Option<Phase>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotSink for LogSink {
    fn publish(&mut self, snapshot: &SolarSnapshot) -> Result<()> {
        if self.last_phase != Some(snapshot.phase) {
            match self.last_phase {
                Some(previous) => log_block_start!("{} → {}", previous, snapshot.phase),
                None => log_block_start!("Current phase: {}", snapshot.phase),
            }
            log_indented!(
                "Sun is {} ({})",
                snapshot.state(),
                if snapshot.rising { "rising" } else { "setting" }
            );
            log_indented!("Next dawn:     {}", snapshot.next.dawn.to_rfc3339());
            log_indented!("Next rising:   {}", snapshot.next.rising.to_rfc3339());
            log_indented!("Next noon:     {}", snapshot.next.noon.to_rfc3339());
            log_indented!("Next setting:  {}", snapshot.next.setting.to_rfc3339());
            log_indented!("Next dusk:     {}", snapshot.next.dusk.to_rfc3339());
            log_indented!("Next midnight: {}", snapshot.next.midnight.to_rfc3339());
            self.last_phase = Some(snapshot.phase);
        }

        log_decorated!(
            "elevation {:.2}°, azimuth {:.2}°, brightness {}%",
            snapshot.elevation,
            snapshot.azimuth,
            snapshot.brightness
        );
        Ok(())
    }
}

/// Writes one JSON object per published snapshot.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SnapshotSink for JsonLinesSink<W> {
    fn publish(&mut self, snapshot: &SolarSnapshot) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &snapshot.published())
            .context("Failed to serialize snapshot")?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .context("Failed to write snapshot")?;
        Ok(())
    }
}
