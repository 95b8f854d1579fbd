//! Subscriber setup.
//!
//! The subscriber is installed before the config is read so loader and
//! validation events are kept. The config's `logging.level` is applied
//! afterwards through a reload handle, unless `--log-level` or `RUST_LOG`
//! already chose the filter.

use encantia_config::LogLevel;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Where the active filter directive came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSource {
    Flag(String),
    Env(String),
    Default,
}

impl FilterSource {
    /// `--log-level` wins over `RUST_LOG`.
    pub fn resolve(flag: Option<&str>, env: Option<String>) -> Self {
        match (flag, env) {
            (Some(flag), _) => Self::Flag(flag.to_string()),
            (None, Some(env)) if !env.trim().is_empty() => Self::Env(env),
            _ => Self::Default,
        }
    }

    fn directive(&self) -> &str {
        match self {
            Self::Flag(d) | Self::Env(d) => d,
            Self::Default => LogLevel::default().directive(),
        }
    }

    /// Directive the config level maps to, when nothing overrides it.
    pub fn config_directive(&self, level: LogLevel) -> Option<&'static str> {
        match self {
            Self::Default => Some(level.directive()),
            _ => None,
        }
    }
}

pub struct Logging {
    source: FilterSource,
    handle: reload::Handle<EnvFilter, Registry>,
}

impl Logging {
    pub fn init(flag: Option<&str>) -> Self {
        let source = FilterSource::resolve(flag, std::env::var(EnvFilter::DEFAULT_ENV).ok());
        let filter = EnvFilter::try_new(source.directive()).unwrap_or_else(|e| {
            eprintln!("invalid log filter {:?}: {e}", source.directive());
            EnvFilter::new(LogLevel::default().directive())
        });

        let (filter, handle) = reload::Layer::new(filter);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
        Self { source, handle }
    }

    /// Switch to the config's level unless the filter was overridden.
    pub fn apply_config(&self, level: LogLevel) {
        let Some(directive) = self.source.config_directive(level) else {
            return;
        };
        if let Err(e) = self.handle.reload(EnvFilter::new(directive)) {
            tracing::warn!(error = %e, "Failed to apply configured log level");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_env() {
        let source = FilterSource::resolve(Some("debug"), Some("warn".into()));
        assert_eq!(source, FilterSource::Flag("debug".into()));
        assert_eq!(source.config_directive(LogLevel::Error), None);
    }

    #[test]
    fn env_beats_config() {
        let source = FilterSource::resolve(None, Some("encantia=trace".into()));
        assert_eq!(source.directive(), "encantia=trace");
        assert_eq!(source.config_directive(LogLevel::Warn), None);
    }

    // Before the config is read the default directive must let warnings
    // through, so validation warnings are not lost.
    #[test]
    fn startup_filter_passes_warnings() {
        let source = FilterSource::resolve(None, None);
        assert_eq!(source, FilterSource::Default);
        assert_eq!(source.directive(), "encantia=info");
        assert_eq!(
            source.config_directive(LogLevel::Debug),
            Some("encantia=debug")
        );
    }

    #[test]
    fn blank_env_is_ignored() {
        assert_eq!(FilterSource::resolve(None, Some("  ".into())), FilterSource::Default);
    }
}
