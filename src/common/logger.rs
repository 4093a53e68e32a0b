//! Structured logging with box-drawing output.
//!
//! All crate output goes through the macros defined here. Lines are written to
//! stdout with a `┃`/`┣` pipe structure so that a tracker session reads as one
//! continuous block. Logging can be switched off entirely (tests, `--json`
//! output) and debug lines are gated separately.
//!
//! ## Conventions
//!
//! - **`log_block_start!`**: starts a new conceptual block (phase change,
//!   configuration loaded, tracker started). Prints an empty pipe first.
//! - **`log_decorated!`**: a line belonging to the current block.
//! - **`log_indented!`**: nested detail under a decorated line.
//! - **`log_pipe!`**: an empty pipe line for spacing before a semantic log line.
//! - **`log_version!`** / **`log_end!`**: session header and terminator.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`**:
//!   `[LEVEL]`-prefixed lines. `log_debug!` only prints when debug output is on.
//!
//! In simulation mode every line is prefixed with the simulated UTC instant so
//! a fast-forwarded run can be read back against the solar timeline.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Runtime switches for the logging macros.
pub struct Log;

impl Log {
    /// Enable or disable all log output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Enable or disable `log_debug!` output.
    pub fn set_debug_enabled(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug_enabled() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Timestamp prefix for simulation mode, empty otherwise.
    ///
    /// Public for macro access.
    pub fn get_timestamp_prefix() -> String {
        if crate::time::source::is_initialized() && crate::time::source::is_simulated() {
            let now = crate::time::source::now();
            format!("[{}] ", now.format("%Y-%m-%d %H:%M:%SZ"))
        } else {
            String::new()
        }
    }
}

/// Write a fully formatted line. Needed by the macros.
pub fn write_output(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}

// # Logging Macros

/// Log a decorated message as part of the current block.
#[macro_export]
macro_rules! log_decorated {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(&format!("{prefix}┣ {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(&format!("{prefix}┣ {expr}\n"));
        }
    }};
}

/// Log an indented detail line.
#[macro_export]
macro_rules! log_indented {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(&format!("{prefix}┃   {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(&format!("{prefix}┃   {expr}\n"));
        }
    }};
}

/// Log an empty pipe line for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            $crate::common::logger::write_output(&format!("{prefix}┃\n"));
        }
    }};
}

/// Start a new block of related log lines.
#[macro_export]
macro_rules! log_block_start {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(&format!("{prefix}┃\n{prefix}┣ {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(&format!("{prefix}┃\n{prefix}┣ {expr}\n"));
        }
    }};
}

/// Log the session header.
#[macro_export]
macro_rules! log_version {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let version = env!("CARGO_PKG_VERSION");
            $crate::common::logger::write_output(&format!("{prefix}┏ suntrack v{version} ━━╸\n"));
        }
    }};
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            $crate::common::logger::write_output(&format!("{prefix}╹\n"));
        }
    }};
}

/// Shared body of the `[LEVEL]` macros.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_level {
    ($color:literal, $level:literal, $message:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = $message;
            $crate::common::logger::write_output(&format!(
                "{prefix}┣[\x1b[{}m{}\x1b[0m] {message}\n",
                $color, $level
            ));
        }
    }};
}

/// Log an informational message.
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_level!("32", "INFO", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_level!("32", "INFO", $expr)
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! log_warning {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_level!("33", "WARNING", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_level!("33", "WARNING", $expr)
    };
}

/// Log an error message.
#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_level!("31", "ERROR", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_level!("31", "ERROR", $expr)
    };
}

/// Log a critical message. Used for defects such as broken scheduling invariants.
#[macro_export]
macro_rules! log_critical {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_level!("31", "CRITICAL", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_level!("31", "CRITICAL", $expr)
    };
}

/// Log a debug message, only when debug output is enabled.
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $($arg:tt)*) => {{
        if $crate::common::logger::Log::is_debug_enabled() {
            $crate::__log_level!("32", "DEBUG", format!($fmt $($arg)*))
        }
    }};
    ($expr:expr) => {{
        if $crate::common::logger::Log::is_debug_enabled() {
            $crate::__log_level!("32", "DEBUG", $expr)
        }
    }};
}
