//! Tracing subscriber setup

use medley_core::Config;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Production gets JSON lines for
/// log shipping; everything else gets a compact console format.
pub fn init_telemetry(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "medley_api=debug,medley_core=debug,medley_db=debug,medley_storage=debug,\
         medley_pipeline=debug,tower_http=debug"
            .into()
    });

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        let console_fmt = tracing_subscriber::fmt::layer().event_format(
            Format::default()
                .compact()
                .with_target(false)
                .without_time(),
        );
        tracing_subscriber::registry()
            .with(filter)
            .with(console_fmt)
            .init();
    }
}
