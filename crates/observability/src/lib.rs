//! Tracing and logging setup shared by binaries.

/// Initialize process-wide logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, formats, writers).
pub mod tracing;

pub use crate::tracing::{LogFormat, subscriber};
