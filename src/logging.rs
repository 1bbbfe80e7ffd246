//! Subscriber setup for binaries and tests
//!
//! Library code logs through the `log` facade and opens `tracing` spans
//! around saves. Installing the fmt subscriber here routes both to stderr,
//! as JSON lines or human readable output.

use tracing_subscriber::EnvFilter;

/// Logging options, usually taken from [`crate::config::ClientConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct LogOptions {
    /// Filter used when `RUST_LOG` is unset, e.g. `info` or `configdns=debug`
    pub level: String,
    pub json: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Install the global subscriber. Returns `false` if one was already
/// installed, which leaves the existing subscriber in place.
pub fn init_logging(options: &LogOptions) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if options.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            log::debug!("Tracing subscriber already initialized: {}", e);
            false
        }
    }
}
