//! Logging utilities and structured logging support
//!
//! The library only emits through the `log` facade. Hosts pick the backend;
//! these helpers install `env_logger` for binaries and tests.

pub use log::{debug, error, info, trace, warn};

/// Default filter applied when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Initialize the logging system.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let env = env_logger::Env::default().default_filter_or(DEFAULT_FILTER);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("logger already initialized");
    }
}

/// Initialize logging for unit and integration tests (captured output, debug level)
pub fn init_for_tests() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
