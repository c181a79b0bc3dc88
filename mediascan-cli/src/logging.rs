// ============================================================================
// mediascan-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger setup for the CLI
//
// All crates log through the `log` facade; the binary installs env_logger
// writing to stderr so stdout stays clean for --json output.
//
// LEVELS:
// - default: info
// - --verbose: debug (shows the raw ffmpeg text being parsed)
// - RUST_LOG, when set, overrides both

use env_logger::Env;

/// Default filter for the given verbosity.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Installs the global logger. Call once, before any command runs.
pub fn init(verbose: bool) {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter(verbose)))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "info");
        assert_eq!(default_filter(true), "debug");
    }
}
