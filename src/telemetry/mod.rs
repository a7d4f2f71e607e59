//! Telemetry for AtendentePro
//!
//! Sets up `tracing` output, optionally exports spans to an OTLP collector,
//! and keeps a per-session ledger of run events and token usage for the
//! summary printed when a chat ends.

use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace as sdktrace, Resource};
use std::time::{Duration, Instant};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::agent::{AgentKind, RunEvent, RunResult};
use crate::cli::Verbosity;
use crate::config::TelemetrySettings;
use crate::llm::Usage;

/// Flushes exported spans when dropped
#[must_use = "spans are flushed when the guard is dropped"]
pub struct TracingGuard {
    exporting: bool,
}

impl TracingGuard {
    /// Whether spans go to an OTLP collector
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if self.exporting {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the verbosity flag.
///
/// Spans are also exported over OTLP when the settings or
/// `OTEL_EXPORTER_OTLP_ENDPOINT` name a collector. Must run inside the
/// tokio runtime.
pub fn init_tracing(verbosity: Verbosity, settings: &TelemetrySettings) -> TracingGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let endpoint = settings.exporter_endpoint(|key| std::env::var(key).ok());
    let mut export_error = None;
    let otel_layer = endpoint.as_deref().and_then(|endpoint| {
        match otlp_tracer(endpoint, &settings.service_name) {
            Ok(tracer) => Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Err(e) => {
                export_error = Some(e);
                None
            }
        }
    });
    let exporting = otel_layer.is_some();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init();

    if let Some(e) = export_error {
        tracing::warn!("trace export disabled: {}", e);
    } else if let Some(endpoint) = endpoint {
        tracing::debug!(endpoint = %endpoint, "exporting spans over OTLP");
    }
    TracingGuard { exporting }
}

fn otlp_tracer(endpoint: &str, service_name: &str) -> Result<sdktrace::Tracer, opentelemetry::trace::TraceError> {
    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(opentelemetry_otlp::new_exporter().tonic().with_endpoint(endpoint))
        .with_trace_config(
            sdktrace::config().with_resource(Resource::new(vec![KeyValue::new(
                "service.name",
                service_name.to_string(),
            )])),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)
}

/// Telemetry statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryStats {
    pub turns: usize,
    pub handoffs: usize,
    pub tools_called: usize,
    pub guardrail_trips: usize,
    pub failed_turns: usize,
    pub usage: Usage,
}

/// Session ledger
#[derive(Debug, Clone)]
pub struct TelemetryCollector {
    stats: TelemetryStats,
    last_agent: Option<AgentKind>,
    started_at: DateTime<Utc>,
    start_time: Instant,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            stats: TelemetryStats::default(),
            last_agent: None,
            started_at: Utc::now(),
            start_time: Instant::now(),
        }
    }

    /// Fold a finished run into the stats
    pub fn record_run(&mut self, result: &RunResult) {
        self.stats.turns += 1;
        self.stats.usage.add(&result.usage);

        // the first AgentUpdated is the starting agent, not a handoff
        for event in result.events.iter().skip(1) {
            match event {
                RunEvent::AgentUpdated { .. } => self.stats.handoffs += 1,
                RunEvent::ToolCalled { .. } => self.stats.tools_called += 1,
                RunEvent::ToolOutput { .. } | RunEvent::MessageOutput { .. } => {}
            }
        }
        self.last_agent = Some(result.last_agent);
    }

    pub fn record_guardrail_trip(&mut self) {
        self.stats.turns += 1;
        self.stats.guardrail_trips += 1;
    }

    pub fn record_failure(&mut self) {
        self.stats.turns += 1;
        self.stats.failed_turns += 1;
    }

    pub fn stats(&self) -> &TelemetryStats {
        &self.stats
    }

    pub fn last_agent(&self) -> Option<AgentKind> {
        self.last_agent
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Multi-line session summary
    pub fn summary(&self) -> String {
        let stats = &self.stats;
        format!(
            "📊 Resumo da sessão\n\
             ─────────────────────────────────────\n\
             Início:             {}\n\
             Duração:            {:.1?}\n\
             Turnos:             {}\n\
             Transferências:     {}\n\
             Ferramentas:        {}\n\
             Guardrails ativados: {}\n\
             Falhas:             {}\n\
             Tokens (in/out):    {}/{}",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.elapsed(),
            stats.turns,
            stats.handoffs,
            stats.tools_called,
            stats.guardrail_trips,
            stats.failed_turns,
            stats.usage.prompt_tokens,
            stats.usage.completion_tokens,
        )
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}
