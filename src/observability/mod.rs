//! Observability for tabledef
//!
//! Structured logs only: JSON, deterministic key ordering, one line per
//! event, synchronous.

mod logger;

pub use logger::{Logger, Severity};
