//! tracing subscriber setup shared by the binaries

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when neither a directive nor `RUST_LOG` is given
pub const DEFAULT_FILTER: &str = "warn";

/// Install a stderr subscriber so stdout carries only the report.
///
/// `directive` wins over `RUST_LOG`, which wins over [`DEFAULT_FILTER`].
/// Calling this twice keeps the first subscriber.
pub fn init(directive: Option<&str>) {
    let filter = match directive {
        Some(d) => EnvFilter::new(d),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
