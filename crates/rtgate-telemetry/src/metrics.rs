//! Prometheus registry for the bridge.

use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics shared between the HTTP layer and handlers.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    rpc_failures_total: IntCounterVec,
    multicall_records_total: IntCounterVec,
}

impl Metrics {
    /// Construct a registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any collector cannot be built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let http_requests_total = counter_vec(
            &registry,
            "http_requests_total",
            "Total HTTP requests served by route and status code",
            &["route", "code"],
        )?;
        let rpc_failures_total = counter_vec(
            &registry,
            "rpc_failures_total",
            "Failed rTorrent operations by operation name",
            &["operation"],
        )?;
        let multicall_records_total = counter_vec(
            &registry,
            "multicall_records_total",
            "Records decoded from multicall responses by record kind",
            &["kind"],
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                rpc_failures_total,
                multicall_records_total,
            }),
        })
    }

    /// Count one served HTTP request.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Count one failed rTorrent operation.
    pub fn inc_rpc_failure(&self, operation: &str) {
        self.inner
            .rpc_failures_total
            .with_label_values(&[operation])
            .inc();
    }

    /// Add `count` decoded records of `kind` (`torrent`, `file`, ...).
    pub fn add_multicall_records(&self, kind: &str, count: usize) {
        self.inner
            .multicall_records_total
            .with_label_values(&[kind])
            .inc_by(u64::try_from(count).unwrap_or(u64::MAX));
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }
}

fn counter_vec(
    registry: &Registry,
    name: &'static str,
    help: &str,
    labels: &[&str],
) -> Result<IntCounterVec> {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })?;
    registry
        .register(Box::new(counter.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })?;
    Ok(counter)
}
