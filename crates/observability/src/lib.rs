//! Process-wide logging setup shared by the client binaries and tests.

pub mod tracing;

pub use crate::tracing::{LOG_FORMAT_VAR, LogFormat};

/// Initialize logging with the format chosen by `BOOKACUT_LOG_FORMAT`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() {
    crate::tracing::init(LogFormat::from_env());
}

/// Initialize logging with an explicit format.
pub fn init_with(format: LogFormat) {
    crate::tracing::init(format);
}
