//! Telemetry initialization (tracing/tracing-subscriber) for applications
//! embedding the builder.
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or directives like
//!   "warn,hierarchy=debug").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! Build summaries are logged at debug level under the `hierarchy` target;
//! duplicate ids and cut self-references at warn.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,hierarchy=debug";

/// Install a global fmt subscriber. Returns false when one was already set,
/// so calling this more than once is harmless.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Choose JSON vs pretty; don't try to store different layer types.
    let installed = match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().try_init(),
        _ => builder.try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        // Another test may have installed the subscriber first.
        let _ = init_tracing();
        assert!(!init_tracing());
    }
}
