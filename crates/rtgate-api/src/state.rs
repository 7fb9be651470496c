//! Shared handler state and upstream health tracking.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rtgate_multicall::{RpcError, Rtorrent, RtorrentError};
use rtgate_telemetry::Metrics;
use tracing::{info, warn};

use crate::http::constants::COMPONENT_RTORRENT;

/// State handed to every handler through `State<Arc<ApiState>>`.
pub struct ApiState {
    /// Typed rTorrent operations.
    pub rtorrent: Rtorrent,
    /// Shared Prometheus registry.
    pub telemetry: Metrics,
    health_status: Mutex<Vec<String>>,
}

impl ApiState {
    /// State with nothing degraded.
    #[must_use]
    pub const fn new(rtorrent: Rtorrent, telemetry: Metrics) -> Self {
        Self {
            rtorrent,
            telemetry,
            health_status: Mutex::new(Vec::new()),
        }
    }

    /// Mark `component` degraded; returns `false` when it already was.
    pub fn add_degraded_component(&self, component: &str) -> bool {
        let mut guard = lock(&self.health_status);
        if guard.iter().any(|entry| entry == component) {
            return false;
        }
        guard.push(component.to_string());
        guard.sort();
        true
    }

    /// Clear `component`; returns `false` when it was not degraded.
    pub fn remove_degraded_component(&self, component: &str) -> bool {
        let mut guard = lock(&self.health_status);
        let previous = guard.len();
        guard.retain(|entry| entry != component);
        guard.len() != previous
    }

    /// Degraded components, sorted.
    #[must_use]
    pub fn current_health_degraded(&self) -> Vec<String> {
        lock(&self.health_status).clone()
    }

    /// The upstream answered; clear any transport degradation.
    pub fn record_upstream_ok(&self) {
        if self.remove_degraded_component(COMPONENT_RTORRENT) {
            info!("rtorrent endpoint reachable again");
        }
    }

    /// Count a failed operation and degrade health when the upstream was unreachable.
    pub fn record_failure(&self, error: &RtorrentError) {
        let Some(operation) = error.operation() else {
            return;
        };
        self.telemetry.inc_rpc_failure(operation);
        match error {
            RtorrentError::Call {
                source: RpcError::Transport { .. },
                ..
            } => {
                if self.add_degraded_component(COMPONENT_RTORRENT) {
                    warn!(operation, "rtorrent endpoint unreachable");
                }
            }
            _ => self.record_upstream_ok(),
        }
    }

    /// Count decoded multicall records of `kind`.
    pub fn record_records(&self, kind: &str, count: usize) {
        self.telemetry.add_multicall_records(kind, count);
        self.record_upstream_ok();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
