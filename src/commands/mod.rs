//! One-shot subcommands.

pub mod simulate;
pub mod status;
