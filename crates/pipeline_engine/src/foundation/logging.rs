//! Logging utilities

pub use log::{debug, info, warn, error, trace};

use env_logger::{Builder, Env};

/// Initialize the logging system, honouring `RUST_LOG`
pub fn init() {
    init_with_level("info");
}

/// Initialize logging with a default filter used when `RUST_LOG` is unset
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_with_level(default_filter: &str) {
    let env = Env::default().default_filter_or(default_filter);
    if Builder::from_env(env).format_timestamp_millis().try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
