//! Time handling: the process-wide clock and simulation support.

pub mod source;
