//! Request-outcome and rate-limit counters, constructed once at wiring time
//! and injected into [`crate::services::auth_service::AuthService`] and the
//! axum `AppState` - never read from global state, unlike the teacher's
//! `OnceLock`-based `services::metrics` globals.

use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub request_outcomes: IntCounterVec,
    pub request_duration_seconds: HistogramVec,
    pub rate_limit_hits: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let request_outcomes = IntCounterVec::new(
            Opts::new(
                "auth_request_outcomes_total",
                "Total AuthService requests by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "auth_request_duration_seconds",
                "AuthService request latency by operation",
            ),
            &["operation"],
        )?;

        let rate_limit_hits = IntCounterVec::new(
            Opts::new(
                "auth_rate_limit_hits_total",
                "Rate-limit denials by limit type",
            ),
            &["limit_type"],
        )?;

        registry.register(Box::new(request_outcomes.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        registry.register(Box::new(rate_limit_hits.clone()))?;

        Ok(Self {
            registry,
            request_outcomes,
            request_duration_seconds,
            rate_limit_hits,
        })
    }

    pub fn record_outcome(&self, operation: &str, outcome: &str) {
        self.request_outcomes.with_label_values(&[operation, outcome]).inc();
    }

    pub fn record_rate_limit_hit(&self, limit_type: &str) {
        self.rate_limit_hits.with_label_values(&[limit_type]).inc();
    }

    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("failed to encode metrics: {}", e);
            return format!("# failed to encode metrics: {}\n", e);
        }

        String::from_utf8(buffer).unwrap_or_else(|e| {
            tracing::error!("failed to convert metrics to utf-8: {}", e);
            format!("# failed to convert metrics to utf-8: {}\n", e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_registered_families() {
        let metrics = Metrics::new().unwrap();
        metrics.record_outcome("verify_otp", "ok");
        metrics.record_rate_limit_hit("phone");
        let rendered = metrics.render();
        assert!(rendered.contains("auth_request_outcomes_total"));
        assert!(rendered.contains("auth_rate_limit_hits_total"));
    }
}
