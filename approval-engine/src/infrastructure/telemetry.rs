use tracing::metadata::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use super::config::TelemetryConfig;

/// Console logging. `RUST_LOG` directives take precedence over the configured level.
pub fn initialize_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    if !*config.enable() {
        return Ok(());
    }
    let level: LevelFilter = config.level().parse()?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let enable_debug_logging = *config.enable_debug_logging();
    let console = tracing_subscriber::fmt::layer()
        .with_file(enable_debug_logging)
        .with_line_number(enable_debug_logging)
        .with_thread_ids(enable_debug_logging)
        .with_target(enable_debug_logging)
        .with_filter(filter);
    Registry::default().with(console).try_init()?;
    Ok(())
}
