//! Shared tracing configuration for the sigmatics workspace.
//!
//! Binaries, benches and integration tests install their `tracing`
//! subscriber through this crate so the compiler core only ever emits
//! events and never decides where they go.

pub mod performance;

#[macro_use]
pub mod macros;

use std::env;
use std::error::Error;
use std::fmt;

pub use tracing::{debug, error, info, trace, warn};

use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Registry};

/// Configuration describing how the shared subscriber should behave.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Explicit filter directives (e.g. `sigmatics_compiler=trace`). When
    /// absent `RUST_LOG` is consulted, then [`TracingConfig::default_directive`].
    pub directives: Option<String>,
    /// Directive used when nothing else resolves.
    pub default_directive: String,
    /// Show event targets (module paths).
    pub include_targets: bool,
    /// ANSI colour output.
    pub ansi: bool,
    /// Span lifecycle events to emit.
    pub span_events: FmtSpan,
    /// Output format for the formatter layer.
    pub output: TracingOutput,
    /// Minimum duration for [`performance::PerformanceSpan`] completion events.
    pub performance_threshold_us: Option<u64>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_local()
    }
}

impl TracingConfig {
    /// Pretty, coloured output for local development.
    pub fn for_local() -> Self {
        Self {
            directives: None,
            default_directive: "info".to_string(),
            include_targets: true,
            ansi: true,
            span_events: FmtSpan::NONE,
            output: TracingOutput::Pretty,
            performance_threshold_us: None,
        }
    }

    /// JSON lines without colour, for CI and log collectors.
    pub fn for_ci() -> Self {
        Self {
            directives: None,
            default_directive: "info".to_string(),
            include_targets: true,
            ansi: false,
            span_events: FmtSpan::NONE,
            output: TracingOutput::Json,
            performance_threshold_us: None,
        }
    }

    /// Build a configuration from environment hints.
    ///
    /// # Environment Variables
    ///
    /// - `SIGMATICS_TRACING_PROFILE` - `local` (default) or `ci`
    /// - `SIGMATICS_TRACING_DIRECTIVES` - overrides filter directives
    /// - `SIGMATICS_TRACING_FORMAT` - `pretty`, `compact` or `json`
    /// - `SIGMATICS_PERF_THRESHOLD_US` - minimum span duration to report
    pub fn from_env() -> Self {
        let profile = env::var("SIGMATICS_TRACING_PROFILE")
            .unwrap_or_else(|_| "local".to_string())
            .to_ascii_lowercase();

        let mut config = match profile.as_str() {
            "ci" => Self::for_ci(),
            _ => Self::for_local(),
        };

        if let Ok(directives) = env::var("SIGMATICS_TRACING_DIRECTIVES") {
            if !directives.trim().is_empty() {
                config.directives = Some(directives);
            }
        }

        if let Ok(format) = env::var("SIGMATICS_TRACING_FORMAT") {
            if let Some(parsed) = TracingOutput::from_env_value(&format) {
                config.output = parsed;
                if config.output == TracingOutput::Json {
                    config.ansi = false;
                }
            }
        }

        if let Ok(threshold) = env::var("SIGMATICS_PERF_THRESHOLD_US") {
            if let Ok(threshold_us) = threshold.trim().parse::<u64>() {
                config.performance_threshold_us = Some(threshold_us);
            }
        }

        config
    }

    fn resolve_filter(&self) -> Result<EnvFilter, TracingSetupError> {
        match &self.directives {
            Some(directives) => {
                EnvFilter::try_new(directives).map_err(|err| TracingSetupError::InvalidFilter(err.to_string()))
            }
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_directive))),
        }
    }
}

/// Output format choices for the formatter layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingOutput {
    Compact,
    Pretty,
    Json,
}

impl TracingOutput {
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Errors surfaced while installing the subscriber.
#[derive(Debug)]
pub enum TracingSetupError {
    /// The directive string could not be parsed.
    InvalidFilter(String),
    /// A global subscriber is already installed.
    SubscriberInit(tracing_subscriber::util::TryInitError),
}

impl fmt::Display for TracingSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TracingSetupError::InvalidFilter(msg) => write!(f, "invalid tracing directive: {msg}"),
            TracingSetupError::SubscriberInit(err) => {
                write!(f, "failed to install global tracing subscriber: {err}")
            }
        }
    }
}

impl Error for TracingSetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TracingSetupError::SubscriberInit(err) => Some(err),
            TracingSetupError::InvalidFilter(_) => None,
        }
    }
}

/// Build a subscriber for the given configuration without installing it.
pub fn build_subscriber(config: &TracingConfig) -> Result<impl Subscriber + Send + Sync, TracingSetupError> {
    let filter = config.resolve_filter()?;
    Ok(Registry::default().with(format_layer(config)).with(filter))
}

fn format_layer(config: &TracingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let span_events = config.span_events.clone();
    match config.output {
        TracingOutput::Compact => Box::new(
            tracing_fmt::layer()
                .compact()
                .with_target(config.include_targets)
                .with_ansi(config.ansi)
                .with_span_events(span_events),
        ),
        TracingOutput::Pretty => Box::new(
            tracing_fmt::layer()
                .pretty()
                .with_target(config.include_targets)
                .with_ansi(config.ansi)
                .with_span_events(span_events),
        ),
        TracingOutput::Json => Box::new(
            tracing_fmt::layer()
                .json()
                .with_target(config.include_targets)
                .with_ansi(false)
                .with_span_events(span_events),
        ),
    }
}

/// Install the configured subscriber as the process-wide default and
/// register the performance threshold.
pub fn init_global_tracing(config: &TracingConfig) -> Result<(), TracingSetupError> {
    performance::set_default_threshold(config.performance_threshold_us);
    build_subscriber(config)?
        .try_init()
        .map_err(TracingSetupError::SubscriberInit)
}
