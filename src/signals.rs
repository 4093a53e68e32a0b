//! Process signal handling.
//!
//! A background thread turns signals into [`SignalMessage`]s for the runtime
//! loop: SIGINT and SIGTERM stop tracking, SIGHUP and SIGUSR2 reload the
//! configuration.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Reload configuration (SIGHUP, SIGUSR2).
    Reload,
    /// Stop tracking (SIGINT, SIGTERM).
    Shutdown,
}

/// Signal state shared between the handler thread and the runtime loop.
pub struct SignalState {
    /// Cleared once a shutdown signal arrives.
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Kept so callers other than the handler thread can inject messages.
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// State with no OS handlers attached.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request a stop from inside the process.
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.signal_sender.send(SignalMessage::Shutdown).ok();
    }
}

/// Map a raw signal number to a message.
pub fn classify(signal: i32) -> Option<SignalMessage> {
    match signal {
        SIGINT | SIGTERM => Some(SignalMessage::Shutdown),
        SIGHUP | SIGUSR2 => Some(SignalMessage::Reload),
        _ => None,
    }
}

/// Register OS signal handlers and start the forwarding thread.
pub fn setup_signal_handler() -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running = Arc::clone(&state.running);
    let sender = state.signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            let Some(message) = classify(sig) else {
                continue;
            };
            if message == SignalMessage::Shutdown {
                running.store(false, Ordering::SeqCst);
            }
            if sender.send(message).is_err() {
                // Receiver dropped: the runtime is gone.
                break;
            }
            if message == SignalMessage::Shutdown {
                break;
            }
        }
    });

    Ok(state)
}
