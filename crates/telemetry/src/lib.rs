//! Tracing/logging bootstrap.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shelf_kernel::settings::{LogFormat, TelemetrySettings};

/// Initialize the global subscriber. `RUST_LOG` narrows the filter;
/// without it everything at `info` and above is emitted. Safe to call more
/// than once (later calls are no-ops).
pub fn init(settings: &TelemetrySettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init(),
    };

    if result.is_ok() {
        tracing::debug!(format = ?settings.log_format, "telemetry initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let settings = TelemetrySettings::default();
        init(&settings);
        init(&settings);
    }
}
