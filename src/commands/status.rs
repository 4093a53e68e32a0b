//! `suntrack status`: print the current sun state as JSON.

use anyhow::{Context, Result};

use crate::config;
use crate::error::SunError;
use crate::solar::{SpaProvider, SolarSnapshot};
use crate::time::source;

/// Compute one snapshot for the configured location and print it.
pub fn handle_status_command(debug_enabled: bool) -> Result<()> {
    crate::common::logger::Log::set_debug_enabled(debug_enabled);

    let config_path = config::get_config_path()?;
    let config = config::load_from_path(&config_path)?;
    let location = config.location()?.ok_or_else(|| {
        SunError::Configuration(format!(
            "no observer location configured in {}",
            config_path.display()
        ))
    })?;

    let now = source::now();
    log_debug!("Computing status for {location} at {}", now.to_rfc3339());
    let snapshot = SolarSnapshot::compute(&SpaProvider::new(), &location, now)?;

    let json = serde_json::to_string_pretty(&snapshot.published())
        .context("Failed to serialize sun state")?;
    println!("{json}");
    Ok(())
}
