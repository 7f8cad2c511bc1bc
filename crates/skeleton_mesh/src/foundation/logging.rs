//! Logging setup for hosts and tools that embed the batcher
//!
//! The crate itself only talks to the `log` facade. Binaries decide where
//! the records go; these helpers install `env_logger` with sensible defaults.

pub use log::{debug, info, trace, warn, LevelFilter};

/// Initialize logging from `RUST_LOG`, falling back to `info`
pub fn init() {
    init_with_default(LevelFilter::Info);
}

/// Initialize logging from `RUST_LOG`, falling back to `default_level`
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_with_default(default_level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}
