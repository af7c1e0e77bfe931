//! ptail - Papertrail search and live-tail client
//!
//! This crate implements `ptail`, a command-line client that searches the
//! Papertrail log service and prints matching events, optionally following
//! new events as they arrive (tailing).

pub mod api;
pub mod format;
pub mod query;
pub mod signal;
pub mod tail;
pub mod token;
pub mod ui;

pub use api::{Event, ResponseMeta, SearchBackend, SearchError, SearchFilter, SearchResult};
pub use format::format_event;
pub use query::{BuiltQuery, QueryError, QuerySpec};
pub use signal::ShutdownSignal;
pub use tail::{TailConfig, TailLoop, TailMode, TailOutcome};
pub use token::{read_token, TokenError};
pub use ui::Ui;
