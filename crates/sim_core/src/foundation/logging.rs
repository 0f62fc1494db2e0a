//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system.
///
/// Honors `RUST_LOG`; falls back to `default_filter` when it is unset.
/// Calling this more than once is harmless.
pub fn init(default_filter: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();
}
