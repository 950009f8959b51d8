use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::BoxError;

/// Initialize a tracing subscriber with default configuration.
///
/// Uses the `RUST_LOG` environment variable to determine the log level,
/// defaulting to "info" if not set.
pub fn init() -> Result<(), BoxError> {
    init_with_default("info")
}

/// Initialize a tracing subscriber, falling back to `default_directive`
/// when `RUST_LOG` is not set or cannot be parsed.
///
/// Events go to stderr so command output on stdout stays machine-readable.
pub fn init_with_default(default_directive: &str) -> Result<(), BoxError> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter_layer = resolve_filter(from_env.as_deref(), default_directive)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn resolve_filter(from_env: Option<&str>, default_directive: &str) -> Result<EnvFilter, BoxError> {
    if let Some(directives) = from_env
        && let Ok(filter) = EnvFilter::try_new(directives)
    {
        return Ok(filter);
    }
    Ok(EnvFilter::try_new(default_directive)?)
}
