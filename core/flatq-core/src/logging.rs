//! Tracing subscriber setup for the flatq binaries

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// Install a stderr subscriber filtered at `level` (trace, debug, info, warn, error).
///
/// `RUST_LOG`, when set, wins over `level`. Output goes to stderr so it never
/// interleaves with query results on stdout. Calling this twice is harmless.
///
/// ```rust
/// flatq_core::logging::init_with_level("warn");
/// ```
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) {}
