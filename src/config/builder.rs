//! Default configuration file generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;
use crate::solar::Phase;

/// Write a commented default `suntrack.toml` to `path`.
///
/// Coordinates are left commented out: the tracker has no way of guessing
/// where it is, and refuses to start until they are filled in.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let mut builder = ConfigBuilder::new()
        .add_section("Location")
        .add_commented_setting("latitude", "51.4769", "Observer latitude in degrees (-90 to 90)")
        .add_commented_setting(
            "longitude",
            "-0.0005",
            "Observer longitude in degrees (-180 to 180)",
        )
        .add_commented_setting("elevation", "45.0", "Meters above sea level (optional)")
        .add_section("Cadence")
        .add_setting(
            "suppression_factor",
            &format!("{DEFAULT_SUPPRESSION_FACTOR}"),
            &format!(
                "Skip position updates this many intervals before a transition ({MINIMUM_SUPPRESSION_FACTOR}-{MAXIMUM_SUPPRESSION_FACTOR})"
            ),
        )
        .add_table(
            "intervals",
            &format!(
                "Position update interval per phase in minutes ({MINIMUM_INTERVAL_MINUTES}-{MAXIMUM_INTERVAL_MINUTES})"
            ),
        );
    for phase in Phase::ALL {
        builder = builder.add_setting(
            phase.as_str(),
            &phase.default_interval().num_minutes().to_string(),
            phase.display_name(),
        );
    }

    let content = builder.build();
    fs::write(path, content + "\n")
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}

/// Builds config file text with the inline comments aligned in one column.
struct ConfigBuilder {
    entries: Vec<Entry>,
}

enum Entry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Comment-only heading.
    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(Entry::Section(format!("#[{title}]")));
        self
    }

    /// A real TOML table header with a trailing comment.
    fn add_table(mut self, name: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("[{name}]"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("#{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Setting { line, .. } => Some(line.len()),
                Entry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for entry in self.entries {
            match entry {
                Entry::Section(title) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                Entry::Setting { line, comment } => {
                    // Tables get a blank line of their own.
                    if line.starts_with('[') && !lines.is_empty() {
                        lines.push(String::new());
                    }
                    let padding = " ".repeat(width - line.len());
                    lines.push(format!("{line}{padding}{comment}"));
                }
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_aligns_comments() {
        let text = ConfigBuilder::new()
            .add_section("A")
            .add_setting("x", "1", "short")
            .add_setting("longer_key", "2", "long")
            .build();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#[A]");
        assert_eq!(lines[1].find('#'), lines[2].find('#'));
    }
}
