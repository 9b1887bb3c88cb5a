//! Tracing setup for the `reelsmith` binary.
//!
//! Logs go to stderr so the batch summary and `check` table on stdout stay
//! clean when piped.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

const FALLBACK_DIRECTIVE: &str = "info";

/// Where the active filter directive came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    /// `RUST_LOG`
    Environment,
    /// `logging.level` in the config file, or `--verbose`
    Config,
    /// Neither parsed; `info` is used.
    Fallback,
}

/// Pick the filter directive. A set, parseable `RUST_LOG` wins over the
/// configured level; an unparseable one is ignored.
pub fn resolve_directive(level: &str, rust_log: Option<&str>) -> (String, FilterSource) {
    let parses = |directive: &str| EnvFilter::try_new(directive).is_ok();

    if let Some(env) = rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        if parses(env) {
            return (env.to_string(), FilterSource::Environment);
        }
    }
    let level = level.trim();
    if !level.is_empty() && parses(level) {
        return (level.to_string(), FilterSource::Config);
    }
    (FALLBACK_DIRECTIVE.to_string(), FilterSource::Fallback)
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (directive, source) = resolve_directive(&config.level, rust_log.as_deref());
    let env_filter = EnvFilter::new(&directive);

    let installed = if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    };

    if installed && source == FilterSource::Fallback {
        tracing::warn!(
            level = %config.level,
            rust_log = ?rust_log,
            "Unrecognised log filter, using {FALLBACK_DIRECTIVE}"
        );
    }
}
