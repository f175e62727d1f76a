use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

/// Cancellation flag raised by Ctrl+C.
///
/// The first interrupt asks running work to stop after the assets already in
/// flight. A second one exits immediately.
pub struct ShutdownSignal {
    requested: AtomicBool,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    /// Create a signal and hook it up to Ctrl+C
    pub fn install() -> anyhow::Result<Arc<Self>> {
        let signal = Arc::new(Self::new());
        let handler = Arc::clone(&signal);
        ctrlc::set_handler(move || {
            if handler.requested.swap(true, Ordering::SeqCst) {
                std::process::exit(130);
            }
            warn!("Interrupted, finishing assets in progress (Ctrl+C again to abort)");
        })?;
        Ok(signal)
    }

    pub fn is_shutdown(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// The underlying flag, for APIs that poll an `&AtomicBool`
    pub fn as_atomic(&self) -> &AtomicBool {
        &self.requested
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
    }

    #[test]
    fn test_raised_through_atomic() {
        let signal = ShutdownSignal::new();
        signal.as_atomic().store(true, Ordering::SeqCst);
        assert!(signal.is_shutdown());
    }
}
