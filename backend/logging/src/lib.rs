//! Structured logging for the thinker service.
//!
//! Console + optional rolling NDJSON file output, and a redaction helper
//! for tokens and addresses that must never reach a log line.

pub mod logger;
pub mod redact;

pub use logger::{init_logger, LogOptions};
pub use redact::redact_sensitive_data;
