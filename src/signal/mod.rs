//! Signal handling for graceful shutdown (SIGINT/SIGTERM)
//!
//! Converts OS interrupt notifications into a process-wide shutdown
//! flag that the tail loop consults between requests and inside the
//! polling delay, so an interrupt during a poll wait stops the loop
//! instead of being ignored until the next request completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Granularity of the interruptible sleep
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Shared shutdown flag, set by the signal handler
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a signal that never fires until `install` or `trigger`
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the SIGINT/SIGTERM handler.
    ///
    /// Must be called at most once per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let triggered = Arc::clone(&self.triggered);
        ctrlc::set_handler(move || {
            triggered.store(true, Ordering::SeqCst);
        })
    }

    /// Request shutdown directly (tests, embedding callers)
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early when shutdown is requested.
    ///
    /// Returns true if the wait was interrupted.
    pub fn sleep_interruptible(&self, duration: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < duration {
            if self.is_triggered() {
                return true;
            }
            let remaining = duration.saturating_sub(start.elapsed());
            std::thread::sleep(remaining.min(SLEEP_SLICE));
        }
        self.is_triggered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untriggered_by_default() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_triggered());
    }

    #[test]
    fn test_trigger_sets_flag_for_all_clones() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();

        signal.trigger();

        assert!(clone.is_triggered());
    }

    #[test]
    fn test_sleep_runs_full_duration_when_untriggered() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();

        let interrupted = signal.sleep_interruptible(Duration::from_millis(50));

        assert!(!interrupted);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_sleep_wakes_early_when_triggered() {
        let signal = ShutdownSignal::new();
        let waker = signal.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            waker.trigger();
        });

        let start = Instant::now();
        let interrupted = signal.sleep_interruptible(Duration::from_secs(5));
        handle.join().unwrap();

        assert!(interrupted);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_pretriggered_sleep_returns_immediately() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        let start = Instant::now();
        assert!(signal.sleep_interruptible(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
