//! fb-square
//!
//! Moves a filled rectangle around a raw framebuffer with the arrow keys.
//! Exits 0 when the keyboard disappears, non-zero on any fatal device error.

use anyhow::Result;
use tracing::{debug, info, warn};

use fb_square::config::{Config, ConfigSource, LogFormat};
use fb_square::cursor::{self, CursorOutcome};
use fb_square::framebuffer;

fn init_logging(config: &Config) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},fb_square={level}",
            level = config.log_level.to_lowercase()
        ))
    });

    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init(),
    }
}

fn main() -> Result<()> {
    let (config, source) = Config::load();
    if let Err(e) = config.validate() {
        eprintln!("fb-square: invalid configuration: {}", e);
        std::process::exit(1);
    }
    init_logging(&config);

    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "Loaded configuration"),
        ConfigSource::Missing(path) => {
            info!(path = %path.display(), "Config file not found, using defaults")
        }
        ConfigSource::Fallback(e) => warn!(error = %e, "Unusable config file, using defaults"),
    }

    info!(
        display = %config.display_path.display(),
        input = %config.input_path.display(),
        width = config.width,
        height = config.height,
        "Device configuration"
    );

    if config.suppress_cursor {
        match cursor::suppress_blink(&config.cursor_blink_path) {
            CursorOutcome::Failed => info!("Continuing without cursor suppression"),
            outcome => debug!(?outcome, "Cursor blink handled"),
        }
    }

    framebuffer::run(&config)
}
