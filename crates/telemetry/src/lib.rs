//! Tracing subscriber bootstrap for Libris binaries.

use anyhow::anyhow;
use libris_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, otherwise the configured directives.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.filter)
            .map_err(|err| anyhow!("invalid telemetry filter '{}': {}", settings.filter, err)),
    }
}

/// Install the global subscriber in the configured format.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {}", err))?;

    tracing::info!(
        target: "libris-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}
