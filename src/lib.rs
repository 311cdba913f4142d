pub mod clock;
pub mod config;
pub mod extraction;
pub mod extractor_config;

pub use clock::{Clock, FixedClock, SystemClock};
pub use extraction::{
    start, ErrorReason, ExtractionResult, Granularity, TemporalValue, TimeExtractor,
};
pub use extractor_config::{ConfigError, DisplayStyle, ExtractorConfig, ValidityWindow};

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber (stderr, `RUST_LOG` or the default filter).
/// A second call is a no-op.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("{} v{} tracing ready", config::APP_NAME, config::APP_VERSION);
    }
}
