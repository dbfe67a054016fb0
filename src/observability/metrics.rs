use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Arc, OnceLock};
use tracing::info;

// Declare the static OnceLock to hold the Metrics.
static METRICS_INSTANCE: OnceLock<Arc<Metrics>> = OnceLock::new();

/// Initializes on first use and returns the process-wide metrics.
pub fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| {
        info!("Initializing Metrics ...");
        Arc::new(Metrics::new().expect("metric definitions are valid"))
    })
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Credential metrics
    pub token_operations: IntCounterVec,

    // Feed metrics
    pub page_fetches: IntCounterVec,
    pub page_fetch_duration: Histogram,
    pub contacts_parsed: IntCounter,
    pub entries_skipped: IntCounter,
    pub photo_fetches: IntCounterVec,

    // Failures by kind: auth, fetch, parse, transport
    pub fetch_failures: IntCounterVec,

    // Config
    pub config_validation_errors: IntCounter,
}

impl Metrics {
    fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("contactsagent".into()), None)?;

        let metrics = Self {
            token_operations: IntCounterVec::new(Opts::new("token_operations_total", "AuthSub token exchanges and revocations"), &["operation", "outcome"])?,

            page_fetches: IntCounterVec::new(Opts::new("page_fetches_total", "Contacts feed page requests"), &["outcome"])?,
            page_fetch_duration: Histogram::with_opts(HistogramOpts::new("page_fetch_duration_seconds", "Feed page fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]))?,
            contacts_parsed: IntCounter::new("contacts_parsed_total", "Contacts appended to a contact list")?,
            entries_skipped: IntCounter::new("entries_skipped_total", "Feed entries dropped for lacking a primary email")?,
            photo_fetches: IntCounterVec::new(Opts::new("photo_fetches_total", "Contact photo requests"), &["outcome"])?,

            fetch_failures: IntCounterVec::new(Opts::new("fetch_failures_total", "Failed contact fetches by error kind"), &["kind"])?,

            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors found while loading config")?,

            registry,
        };

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_operations.clone()))?;
        reg.register(Box::new(metrics.page_fetches.clone()))?;
        reg.register(Box::new(metrics.page_fetch_duration.clone()))?;
        reg.register(Box::new(metrics.contacts_parsed.clone()))?;
        reg.register(Box::new(metrics.entries_skipped.clone()))?;
        reg.register(Box::new(metrics.photo_fetches.clone()))?;
        reg.register(Box::new(metrics.fetch_failures.clone()))?;
        reg.register(Box::new(metrics.config_validation_errors.clone()))?;

        Ok(metrics)
    }

    /// Text exposition format of every registered metric.
    pub fn gather_text(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
