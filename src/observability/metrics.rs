//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define HTTP traffic metrics (request count, latency, sizes)
//! - Expose a Prometheus-compatible snapshot for the scrape route
//! - Record one sample per completed request
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by handler, method, status
//! - `http_request_duration_seconds` (histogram): latency by handler, method
//! - `http_request_duration_highr_seconds` (histogram): latency, fine buckets, no labels
//! - `http_request_size_bytes` / `http_response_size_bytes` (summary): by handler
//! - `http_requests_inprogress` (gauge, optional): in-flight requests
//!
//! # Design Decisions
//! - No global recorder: each `HttpMetrics` owns its recorder and every
//!   update goes through `metrics::with_local_recorder`
//! - Updates are atomic inside the exporter; no locks on the request path
//! - Unmatched routes share the `none` handler label to bound cardinality

use std::sync::Once;
use std::time::Duration;

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Gauge, Unit,
};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};

use crate::config::MetricsConfig;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const REQUEST_DURATION_HIGHR: &str = "http_request_duration_highr_seconds";
pub const REQUEST_SIZE: &str = "http_request_size_bytes";
pub const RESPONSE_SIZE: &str = "http_response_size_bytes";
pub const REQUESTS_IN_PROGRESS: &str = "http_requests_inprogress";

/// Handler label for requests that matched no route.
pub const UNMATCHED_HANDLER: &str = "none";

const LATENCY_BUCKETS: &[f64] = &[0.1, 0.5, 1.0];

const LATENCY_HIGHR_BUCKETS: &[f64] = &[
    0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0,
    7.5, 10.0, 30.0, 60.0,
];

/// Everything recorded about one completed request.
#[derive(Debug, Clone)]
pub struct RequestSample {
    pub handler: String,
    pub method: String,
    pub status: u16,
    pub duration: Duration,
    pub request_size: u64,
    pub response_size: u64,
}

/// Process-wide HTTP metrics registry.
///
/// Constructed once by the composition root and shared behind an `Arc`.
pub struct HttpMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    described: Once,
    config: MetricsConfig,
}

impl HttpMetrics {
    pub fn new(config: MetricsConfig) -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), LATENCY_BUCKETS)?
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION_HIGHR.to_string()),
                LATENCY_HIGHR_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        Ok(Self {
            recorder,
            handle,
            described: Once::new(),
            config,
        })
    }

    /// Register metric descriptions with the exporter.
    ///
    /// Only the first call has any effect; it returns `true`, later calls `false`.
    pub fn initialize(&self) -> bool {
        let mut first = false;
        self.described.call_once(|| {
            metrics::with_local_recorder(&self.recorder, || {
                describe_counter!(
                    REQUESTS_TOTAL,
                    Unit::Count,
                    "Total number of requests by method, status and handler."
                );
                describe_histogram!(
                    REQUEST_DURATION,
                    Unit::Seconds,
                    "Latency with only few buckets by handler."
                );
                describe_histogram!(
                    REQUEST_DURATION_HIGHR,
                    Unit::Seconds,
                    "Latency with many buckets but no API specific labels."
                );
                describe_histogram!(
                    REQUEST_SIZE,
                    Unit::Bytes,
                    "Content length of incoming requests by handler."
                );
                describe_histogram!(
                    RESPONSE_SIZE,
                    Unit::Bytes,
                    "Content length of outgoing responses by handler."
                );
                describe_gauge!(
                    REQUESTS_IN_PROGRESS,
                    Unit::Count,
                    "Number of requests in progress."
                );
            });
            first = true;
        });
        if first {
            tracing::debug!("metrics registered");
        }
        first
    }

    /// Prometheus text exposition of the current state.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    pub fn is_excluded(&self, handler: &str) -> bool {
        self.config.excluded_handlers.iter().any(|h| h == handler)
    }

    /// Status label value: the class (`2xx`) or the exact code.
    pub fn status_label(&self, status: u16) -> String {
        if self.config.group_status_codes {
            format!("{}xx", status / 100)
        } else {
            status.to_string()
        }
    }

    /// Record a completed request.
    pub fn record(&self, sample: &RequestSample) {
        let status = self.status_label(sample.status);
        let seconds = sample.duration.as_secs_f64();

        metrics::with_local_recorder(&self.recorder, || {
            counter!(
                REQUESTS_TOTAL,
                "handler" => sample.handler.clone(),
                "method" => sample.method.clone(),
                "status" => status
            )
            .increment(1);

            histogram!(
                REQUEST_DURATION,
                "handler" => sample.handler.clone(),
                "method" => sample.method.clone()
            )
            .record(seconds);

            histogram!(REQUEST_DURATION_HIGHR).record(seconds);

            histogram!(REQUEST_SIZE, "handler" => sample.handler.clone())
                .record(sample.request_size as f64);
            histogram!(RESPONSE_SIZE, "handler" => sample.handler.clone())
                .record(sample.response_size as f64);
        });
    }

    /// Mark a request as in flight until the returned guard drops.
    ///
    /// Returns `None` when in-progress tracking is disabled.
    pub fn track_in_progress(&self, handler: &str, method: &str) -> Option<InProgressGuard> {
        if !self.config.track_in_progress {
            return None;
        }

        let gauge = metrics::with_local_recorder(&self.recorder, || {
            gauge!(
                REQUESTS_IN_PROGRESS,
                "handler" => handler.to_owned(),
                "method" => method.to_owned()
            )
        });
        gauge.increment(1.0);
        Some(InProgressGuard(gauge))
    }
}

/// Decrements the in-progress gauge on drop, including when the request
/// future is cancelled.
pub struct InProgressGuard(Gauge);

impl Drop for InProgressGuard {
    fn drop(&mut self) {
        self.0.decrement(1.0);
    }
}
