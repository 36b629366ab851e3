//! Logging initialization module

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output on stderr
    Development,
    /// JSON structured output on stderr, for CI log collectors
    Production,
    /// No output; tests install their own capture layer
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once at startup. Later calls are ignored. Logs go to stderr so the
/// run summary printed on stdout stays machine-readable. `RUST_LOG` overrides
/// the default `stackdrift=info` filter.
///
/// ```
/// use stackdrift_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("stackdrift=info")),
                )
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("stackdrift=info")),
                )
                .init();
        }
        Profile::Test => {
            let _ = tracing_subscriber::registry().try_init();
        }
    });
}
