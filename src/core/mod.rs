pub mod config;
pub use config::{AppConfig, ConfigError, QueryType, RetrievalConfig};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives.into())
}

/// Installs the global tracing subscriber. `RUST_LOG` wins when set,
/// otherwise `default_directives` is used. Logs go to stderr so they
/// don't interleave with chat output on stdout. Load `.env` first if
/// `RUST_LOG` may come from there.
pub fn init_tracing(default_directives: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(default_directives))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
