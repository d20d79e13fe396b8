//! Tracing setup.
//!
//! The subscriber is installed before the config file is read so the loader's
//! own log lines are kept. When neither `--log-level` nor `RUST_LOG` picked the
//! filter, it starts at the default level and is swapped for `[logging] level`
//! once the config is loaded.

use hearth_config::schema::LogLevel;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Where the active filter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    Cli,
    Env,
    Config,
}

/// Pick the startup filter: CLI flag, then a valid `RUST_LOG`, then the
/// default config level.
pub fn initial_filter(cli: Option<&str>, rust_log: Option<&str>) -> (EnvFilter, FilterSource) {
    if let Some(directive) = cli {
        return (EnvFilter::new(directive), FilterSource::Cli);
    }
    if let Some(filter) = rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
    {
        return (filter, FilterSource::Env);
    }
    (
        EnvFilter::new(LogLevel::default().as_directive()),
        FilterSource::Config,
    )
}

/// Install the global subscriber. Returns a handle only when the filter is
/// still waiting on the config file.
pub fn init(cli: Option<&str>) -> Option<FilterHandle> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, source) = initial_filter(cli, rust_log.as_deref());
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    (source == FilterSource::Config).then_some(handle)
}

/// Switch the filter to the configured level.
pub fn apply_config_level(handle: &FilterHandle, level: &LogLevel) {
    if let Err(e) = handle.reload(EnvFilter::new(level.as_directive())) {
        tracing::warn!(error = %e, "Could not apply configured log level");
    }
}
