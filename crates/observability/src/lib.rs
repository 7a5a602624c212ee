//! Process-wide logging setup shared by the shop binaries.

pub mod tracing;

pub use self::tracing::{DEFAULT_FILTER, ENV_LOG_FORMAT, LogFormat};

/// Initialize logging from `RUST_LOG` and `PITSTOP_LOG_FORMAT`.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    let format = std::env::var(ENV_LOG_FORMAT)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    self::tracing::init(format);
}
