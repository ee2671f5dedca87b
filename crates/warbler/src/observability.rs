//! Logging initialisation.
//!
//! Every warbler crate logs through `tracing`. This module installs the
//! subscriber: an `EnvFilter` (honouring `RUST_LOG`) and a text or JSON fmt
//! layer. With the `observability` feature, spans are also exported through
//! OpenTelemetry to stdout.

use std::env;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};
use warbler_error::{ConfigError, ConfigErrorKind, WarblerResult};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name for telemetry attribution
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Log level filter (e.g., "info", "warbler_social=debug")
    pub log_level: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl ObservabilityConfig {
    /// Create a configuration with the given service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json_logs: false,
        }
    }

    /// Set the service version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    fn env_filter(&self) -> WarblerResult<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.log_level).map_err(|e| {
                ConfigError::new(ConfigErrorKind::Logging(format!(
                    "invalid log level '{}': {}",
                    self.log_level, e
                )))
                .into()
            }),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

/// Initialise logging with the default configuration.
///
/// # Errors
///
/// Returns error if the log level is invalid or a global subscriber is
/// already installed.
pub fn init_observability() -> WarblerResult<()> {
    init_observability_with_config(ObservabilityConfig::default())
}

/// Initialise logging with a custom configuration.
///
/// # Errors
///
/// Returns error if the log level is invalid or a global subscriber is
/// already installed.
pub fn init_observability_with_config(config: ObservabilityConfig) -> WarblerResult<()> {
    let env_filter = config.env_filter()?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(fmt_layer);

    #[cfg(feature = "observability")]
    let registry = registry.with(otel::layer(&config));

    registry
        .try_init()
        .map_err(|e| ConfigError::new(ConfigErrorKind::Logging(e.to_string())))?;

    tracing::debug!(
        service = %config.service_name,
        version = %config.service_version,
        "Logging initialised"
    );
    Ok(())
}

#[cfg(feature = "observability")]
mod otel {
    use super::ObservabilityConfig;
    use opentelemetry::{KeyValue, global, trace::TracerProvider};
    use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
    use opentelemetry_stdout::SpanExporter;
    use tracing::Subscriber;
    use tracing_subscriber::{Layer, registry::LookupSpan};

    pub(super) fn layer<S>(config: &ObservabilityConfig) -> impl Layer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let resource = Resource::builder()
            .with_service_name(config.service_name.clone())
            .with_attributes(vec![KeyValue::new(
                "service.version",
                config.service_version.clone(),
            )])
            .build();

        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(SpanExporter::default())
            .with_resource(resource)
            .build();

        global::set_tracer_provider(provider.clone());

        let tracer = provider.tracer(config.service_name.clone());
        tracing_opentelemetry::layer().with_tracer(tracer)
    }
}
