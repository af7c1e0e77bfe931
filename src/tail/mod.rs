//! Tail loop
//!
//! The core state machine: repeatedly issues search requests through an
//! injected `SearchBackend`, renders each returned event, and advances
//! the cursor. Two states:
//! - Draining: back-to-back requests while historical backlog is
//!   immediately available
//! - Polling: requests spaced by a fixed delay once the live edge has
//!   been reached
//!
//! Requests, rendering, and output are strictly sequential; the only
//! shared state is the shutdown flag, consulted between requests and
//! inside the polling delay.

use std::time::Duration;

use crate::api::{SearchBackend, SearchFilter, SearchResult};
use crate::format::format_event;
use crate::signal::ShutdownSignal;
use crate::ui::Ui;

/// Delay between requests once the loop is polling at the live edge
pub const POLL_DELAY: Duration = Duration::from_secs(2);

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailMode {
    /// Issuing requests back-to-back; more historical data is expected
    /// to be immediately available
    Draining,

    /// Issuing delayed requests; only new events are expected
    Polling,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailOutcome {
    /// An empty page arrived while `stop_on_empty` was set
    Drained,

    /// The shutdown signal fired
    Interrupted,

    /// The injected iteration bound was reached
    IterationLimit,
}

/// Tail loop configuration, fixed for the lifetime of one run
#[derive(Debug, Clone)]
pub struct TailConfig {
    /// Render events in key-value form instead of raw messages
    pub kv: bool,

    /// Terminate on the first empty page instead of switching to polling
    pub stop_on_empty: bool,

    /// Delay between requests in polling state
    pub poll_delay: Duration,

    /// Stop after this many iterations; used to bound test runs
    pub max_iterations: Option<u64>,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            kv: true,
            stop_on_empty: false,
            poll_delay: POLL_DELAY,
            max_iterations: None,
        }
    }
}

/// The tail loop. Owns the filter (and with it the cursor) exclusively;
/// nothing else mutates resumption state.
#[derive(Debug)]
pub struct TailLoop<B: SearchBackend> {
    backend: B,
    filter: SearchFilter,
    config: TailConfig,
    mode: TailMode,
    shutdown: ShutdownSignal,
    events_emitted: u64,
}

impl<B: SearchBackend> TailLoop<B> {
    /// Create a loop in draining state over the given first filter
    pub fn new(
        backend: B,
        filter: SearchFilter,
        config: TailConfig,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            backend,
            filter,
            config,
            mode: TailMode::Draining,
            shutdown,
            events_emitted: 0,
        }
    }

    /// Current loop state
    pub fn mode(&self) -> TailMode {
        self.mode
    }

    /// The injected backend (tests inspect recorded calls through this)
    pub fn backend_ref(&self) -> &B {
        &self.backend
    }

    /// Current cursor, once one has been obtained
    pub fn cursor(&self) -> Option<&str> {
        self.filter.min_id.as_deref()
    }

    /// Number of events rendered so far
    pub fn events_emitted(&self) -> u64 {
        self.events_emitted
    }

    /// Apply one successful page to the loop state.
    ///
    /// Returns true when the loop should terminate (empty page with
    /// `stop_on_empty`). Otherwise an empty page transitions to polling,
    /// and the cursor is advanced to the page's `max_id` regardless of
    /// whether it held events. Advancing is idempotent, so a repeated
    /// `max_id` at the live edge leaves the filter unchanged.
    pub fn process_result(&mut self, result: &SearchResult) -> bool {
        if result.events.is_empty() {
            if self.config.stop_on_empty {
                return true;
            }
            // No more messages are immediately available; only new or
            // future data is expected from here on.
            self.mode = TailMode::Polling;
        }

        self.filter.advance(&result.max_id);
        false
    }

    /// Drive the loop until a stop condition.
    ///
    /// A failed request is reported through `ui` and re-attempted on the
    /// next pass without advancing the cursor; errors never abort the
    /// loop. Events are rendered oldest-first in service order.
    pub fn run(&mut self, ui: &mut Ui) -> TailOutcome {
        let mut iterations: u64 = 0;

        loop {
            if self.shutdown.is_triggered() {
                return TailOutcome::Interrupted;
            }

            match self.backend.search(&self.filter) {
                Err(e) => {
                    ui.error(&format!("search failed: {}", e));
                }
                Ok((result, _meta)) => {
                    for event in &result.events {
                        ui.output(&format_event(event, self.config.kv));
                        self.events_emitted += 1;
                    }

                    if self.process_result(&result) {
                        return TailOutcome::Drained;
                    }
                }
            }

            iterations += 1;
            if let Some(max) = self.config.max_iterations {
                if iterations >= max {
                    return TailOutcome::IterationLimit;
                }
            }

            if self.mode == TailMode::Polling
                && self.shutdown.sleep_interruptible(self.config.poll_delay)
            {
                return TailOutcome::Interrupted;
            }
        }
    }
}
