//! Logging setup for binaries and benchmarks.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// When `RUST_LOG` is unset or unparsable, `default_directive` (for
/// example `"info"` or `"larvae_engine=debug"`) is used instead. Returns
/// `false` if a global subscriber was already installed, which is not an
/// error: tests and embedding hosts often install their own.
pub fn init_logging(default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_harmless() {
        init_logging("warn");
        assert!(!init_logging("warn"));
    }
}
