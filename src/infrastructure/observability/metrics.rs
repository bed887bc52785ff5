//! Prometheus metrics definitions for dexsentinel.
//!
//! All metrics use the `dexsentinel_` prefix and are read-only.

use prometheus::{
    core::{AtomicF64, GenericGauge},
    CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics for the scan loop and its upstream providers.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Tokens currently on the active watchlist.
    pub watchlist_size: GenericGauge<AtomicF64>,
    /// Seconds the most recent scan tick took to process all tokens.
    pub scan_tick_duration_seconds: HistogramVec,
    /// Signals emitted, by signal_type.
    pub signals_emitted_total: CounterVec,
    /// Signals suppressed by CooldownGate, by signal_type.
    pub signals_suppressed_total: CounterVec,
    /// Circuit breaker status per provider (0=closed, 1=open).
    pub circuit_breaker_status: CounterVec,
    /// Provider request latency in seconds.
    pub provider_latency_seconds: HistogramVec,
    /// Provider request outcomes, by provider and outcome.
    pub provider_requests_total: CounterVec,
    /// Tokens marked rugged by HealthChecker.
    pub tokens_rugged_total: CounterVec,
    /// Scanner uptime in seconds.
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let watchlist_size = Gauge::with_opts(Opts::new(
            "dexsentinel_watchlist_size",
            "Tokens currently on the active watchlist",
        ))?;
        registry.register(Box::new(watchlist_size.clone()))?;

        let scan_tick_duration_seconds = HistogramVec::new(
            HistogramOpts::new("dexsentinel_scan_tick_duration_seconds", "Scan tick wall time in seconds")
                .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["phase"],
        )?;
        registry.register(Box::new(scan_tick_duration_seconds.clone()))?;

        let signals_emitted_total = CounterVec::new(
            Opts::new("dexsentinel_signals_emitted_total", "Signals published to the chat sink"),
            &["signal_type"],
        )?;
        registry.register(Box::new(signals_emitted_total.clone()))?;

        let signals_suppressed_total = CounterVec::new(
            Opts::new("dexsentinel_signals_suppressed_total", "Signals suppressed by the cooldown gate"),
            &["signal_type"],
        )?;
        registry.register(Box::new(signals_suppressed_total.clone()))?;

        let circuit_breaker_status = CounterVec::new(
            Opts::new("dexsentinel_circuit_breaker_trips_total", "Circuit breaker trips by provider"),
            &["provider"],
        )?;
        registry.register(Box::new(circuit_breaker_status.clone()))?;

        let provider_latency_seconds = HistogramVec::new(
            HistogramOpts::new("dexsentinel_provider_latency_seconds", "Upstream provider request latency")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["provider", "endpoint"],
        )?;
        registry.register(Box::new(provider_latency_seconds.clone()))?;

        let provider_requests_total = CounterVec::new(
            Opts::new("dexsentinel_provider_requests_total", "Upstream provider requests by outcome"),
            &["provider", "outcome"],
        )?;
        registry.register(Box::new(provider_requests_total.clone()))?;

        let tokens_rugged_total = CounterVec::new(
            Opts::new("dexsentinel_tokens_rugged_total", "Tokens marked rugged by the health checker"),
            &["reason"],
        )?;
        registry.register(Box::new(tokens_rugged_total.clone()))?;

        let uptime_seconds =
            Gauge::with_opts(Opts::new("dexsentinel_uptime_seconds", "Scanner process uptime in seconds"))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            watchlist_size,
            scan_tick_duration_seconds,
            signals_emitted_total,
            signals_suppressed_total,
            circuit_breaker_status,
            provider_latency_seconds,
            provider_requests_total,
            tokens_rugged_total,
            uptime_seconds,
        })
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families).unwrap_or_default()
    }

    pub fn inc_signal_emitted(&self, signal_type: &str) {
        self.signals_emitted_total.with_label_values(&[signal_type]).inc();
    }

    pub fn inc_signal_suppressed(&self, signal_type: &str) {
        self.signals_suppressed_total.with_label_values(&[signal_type]).inc();
    }

    pub fn observe_provider_latency(&self, provider: &str, endpoint: &str, latency_secs: f64) {
        self.provider_latency_seconds.with_label_values(&[provider, endpoint]).observe(latency_secs);
    }

    pub fn inc_provider_request(&self, provider: &str, outcome: &str) {
        self.provider_requests_total.with_label_values(&[provider, outcome]).inc();
    }

    pub fn inc_circuit_trip(&self, provider: &str) {
        self.circuit_breaker_status.with_label_values(&[provider]).inc();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("failed to create default Metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_render_with_prefix() {
        let metrics = Metrics::new().expect("failed to create metrics");
        assert!(metrics.render().contains("dexsentinel_"));
    }

    #[test]
    fn watchlist_size_gauge_updates() {
        let metrics = Metrics::new().expect("failed to create metrics");
        metrics.watchlist_size.set(42.0);
        assert!(metrics.render().contains("dexsentinel_watchlist_size 42"));
    }

    #[test]
    fn signal_counters_increment_by_label() {
        let metrics = Metrics::new().expect("failed to create metrics");
        metrics.inc_signal_emitted("zone_breakout");
        metrics.inc_signal_suppressed("gem_volume_spike");
        let output = metrics.render();
        assert!(output.contains("dexsentinel_signals_emitted_total"));
        assert!(output.contains("zone_breakout"));
        assert!(output.contains("dexsentinel_signals_suppressed_total"));
    }
}
