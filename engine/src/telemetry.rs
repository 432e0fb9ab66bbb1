//! Logging setup
//!
//! One `tracing-subscriber` registry per process. The filter comes from
//! `RUST_LOG` when set, otherwise from the chosen level applied to the
//! engine and the SDK; the output format comes from `[core] log_format`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Filter directive for `level`, scoped to our own crates so dependency
/// noise (hyper, reqwest) stays at `warn`.
fn filter_directive(level: &str) -> String {
    format!("warn,warden_engine={level},sdk={level}")
}

/// Install the global subscriber.
///
/// Returns false when a subscriber was already installed, e.g. by an earlier
/// call in the same test binary.
pub fn init_telemetry(level: &str, format: LogFormat) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_scopes_our_crates() {
        assert_eq!(
            filter_directive("debug"),
            "warn,warden_engine=debug,sdk=debug"
        );
    }

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        init_telemetry("info", LogFormat::Json);
        assert!(!init_telemetry("trace", LogFormat::Pretty));
    }
}
