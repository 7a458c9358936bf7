//! Prometheus metrics of the relay.
//!
//! Every series lives in a registry owned by [`Metrics`], so independent
//! instances (one per test, for example) never interfere with each other.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use prometheus::{
    Gauge, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "alert_relay";

/// Why delivering an alert failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchFailure {
    /// The alert could not be rendered.
    Preparing,
    /// A rendered chunk could not be delivered.
    Sending,
}

impl DispatchFailure {
    fn as_label(self) -> &'static str {
        match self {
            DispatchFailure::Preparing => "preparing",
            DispatchFailure::Sending => "sending",
        }
    }
}

/// The metric families of the relay, registered in their own registry.
pub struct Metrics {
    registry: Registry,
    started: Instant,
    alerts_dispatched: IntCounterVec,
    alerts_dispatch_errors: IntCounterVec,
    alerts_dispatch_duration: HistogramVec,
    prune_duration: HistogramVec,
    active_threads: IntGaugeVec,
    http_requests: IntCounterVec,
    http_request_errors: IntCounterVec,
    http_request_duration: HistogramVec,
    start_timestamp: Gauge,
    uptime: Gauge,
}

impl Metrics {
    /// Creates and registers all metric families.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let alerts_dispatched = IntCounterVec::new(
            Opts::new("alerts_dispatched_total", "Alerts handed to a provider.")
                .namespace(NAMESPACE),
            &["provider", "room"],
        )?;
        let alerts_dispatch_errors = IntCounterVec::new(
            Opts::new("alerts_dispatched_errors_total", "Alerts that failed to render or send.")
                .namespace(NAMESPACE),
            &["provider", "room", "reason"],
        )?;
        let alerts_dispatch_duration = HistogramVec::new(
            HistogramOpts::new("alerts_dispatched_duration_seconds", "Time spent delivering one alert.")
                .namespace(NAMESPACE),
            &["provider", "room"],
        )?;
        let prune_duration = HistogramVec::new(
            HistogramOpts::new("alerts_prune_duration_seconds", "Time spent pruning thread entries.")
                .namespace(NAMESPACE)
                .buckets(prometheus::exponential_buckets(0.00001, 2.5, 15)?),
            &["provider", "room"],
        )?;
        let active_threads = IntGaugeVec::new(
            Opts::new("active_threads", "Live fingerprint to thread entries.").namespace(NAMESPACE),
            &["provider", "room"],
        )?;
        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests received.").namespace(NAMESPACE),
            &["handler"],
        )?;
        let http_request_errors = IntCounterVec::new(
            Opts::new("http_request_errors_total", "HTTP requests answered with an error.")
                .namespace(NAMESPACE),
            &["handler"],
        )?;
        let http_request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "Time spent handling HTTP requests.")
                .namespace(NAMESPACE),
            &["handler"],
        )?;
        let start_timestamp = Gauge::with_opts(
            Opts::new("start_timestamp_seconds", "Unix time the relay started at.")
                .namespace(NAMESPACE),
        )?;
        let uptime = Gauge::with_opts(
            Opts::new("uptime_seconds", "Seconds since the relay started.").namespace(NAMESPACE),
        )?;

        registry.register(Box::new(alerts_dispatched.clone()))?;
        registry.register(Box::new(alerts_dispatch_errors.clone()))?;
        registry.register(Box::new(alerts_dispatch_duration.clone()))?;
        registry.register(Box::new(prune_duration.clone()))?;
        registry.register(Box::new(active_threads.clone()))?;
        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(http_request_errors.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;
        registry.register(Box::new(start_timestamp.clone()))?;
        registry.register(Box::new(uptime.clone()))?;
        // CPU, memory and file descriptor usage of the relay itself.
        #[cfg(target_os = "linux")]
        registry.register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))?;

        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        start_timestamp.set(now.as_secs_f64());

        Ok(Self {
            registry,
            started: Instant::now(),
            alerts_dispatched,
            alerts_dispatch_errors,
            alerts_dispatch_duration,
            prune_duration,
            active_threads,
            http_requests,
            http_request_errors,
            http_request_duration,
            start_timestamp,
            uptime,
        })
    }

    /// Counts one alert handed to `provider` for `room`.
    pub fn inc_dispatched(&self, provider: &str, room: &str) {
        self.alerts_dispatched.with_label_values(&[provider, room]).inc();
    }

    /// Counts one failed alert.
    pub fn inc_dispatch_error(&self, provider: &str, room: &str, reason: DispatchFailure) {
        self.alerts_dispatch_errors.with_label_values(&[provider, room, reason.as_label()]).inc();
    }

    /// Records the time spent on one alert.
    pub fn observe_dispatch_duration(&self, provider: &str, room: &str, elapsed: Duration) {
        self.alerts_dispatch_duration
            .with_label_values(&[provider, room])
            .observe(elapsed.as_secs_f64());
    }

    /// Records the time spent on one prune cycle.
    pub fn observe_prune_duration(&self, provider: &str, room: &str, elapsed: Duration) {
        self.prune_duration.with_label_values(&[provider, room]).observe(elapsed.as_secs_f64());
    }

    /// Sets the number of live thread entries.
    pub fn set_active_threads(&self, provider: &str, room: &str, count: usize) {
        self.active_threads
            .with_label_values(&[provider, room])
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Counts one request to `handler`.
    pub fn inc_http_request(&self, handler: &str) {
        self.http_requests.with_label_values(&[handler]).inc();
    }

    /// Counts one request to `handler` answered with an error.
    pub fn inc_http_error(&self, handler: &str) {
        self.http_request_errors.with_label_values(&[handler]).inc();
    }

    /// Records the time spent handling one request.
    pub fn observe_http_duration(&self, handler: &str, elapsed: Duration) {
        self.http_request_duration.with_label_values(&[handler]).observe(elapsed.as_secs_f64());
    }

    /// Encodes every series in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        self.uptime.set(self.started.elapsed().as_secs_f64());
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }

    /// Returns the dispatched counter of `provider`/`room`.
    pub fn dispatched(&self, provider: &str, room: &str) -> u64 {
        self.alerts_dispatched.with_label_values(&[provider, room]).get()
    }

    /// Returns the error counter of `provider`/`room` for `reason`.
    pub fn dispatch_errors(&self, provider: &str, room: &str, reason: DispatchFailure) -> u64 {
        self.alerts_dispatch_errors.with_label_values(&[provider, room, reason.as_label()]).get()
    }

    /// Returns the number of observed alert deliveries of `provider`/`room`.
    pub fn dispatch_observations(&self, provider: &str, room: &str) -> u64 {
        self.alerts_dispatch_duration.with_label_values(&[provider, room]).get_sample_count()
    }

    /// Returns the active-thread gauge of `provider`/`room`.
    pub fn active_threads(&self, provider: &str, room: &str) -> i64 {
        self.active_threads.with_label_values(&[provider, room]).get()
    }

    /// Returns the request counter of `handler`.
    pub fn http_requests(&self, handler: &str) -> u64 {
        self.http_requests.with_label_values(&[handler]).get()
    }

    /// Returns the error counter of `handler`.
    pub fn http_errors(&self, handler: &str) -> u64 {
        self.http_request_errors.with_label_values(&[handler]).get()
    }

    /// Returns the Unix time the metrics were created at.
    pub fn start_timestamp(&self) -> f64 {
        self.start_timestamp.get()
    }
}
