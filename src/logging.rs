use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default directive for a given `-v` count.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,audio_scribe_lib=info",
        1 => "warn,audio_scribe_lib=debug",
        _ => "info,audio_scribe_lib=trace",
    }
}

/// Installs the progress-line subscriber on stderr. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose > 0)
                .without_time(),
        )
        .try_init();
}
