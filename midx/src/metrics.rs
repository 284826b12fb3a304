//! Metrics for [super::Midx].

use prometheus_client::{metrics::counter::Counter, registry::Registry};

/// Lookup counters for [super::Midx].
///
/// A single instance may be shared (via [super::Config::metrics]) by every [super::Midx] a caller
/// opens to get totals across files.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Lookups performed.
    pub searches: Counter,
    /// Fanout reads and digest table probes performed by lookups.
    pub steps: Counter,
    /// Files opened in a degraded state.
    pub degraded: Counter,
}

impl Metrics {
    /// Create metrics and register them in the provided registry.
    pub fn new(registry: &mut Registry) -> Self {
        let metrics = Self::default();
        registry.register(
            "searches",
            "Number of lookups performed",
            metrics.searches.clone(),
        );
        registry.register(
            "steps",
            "Number of fanout reads and digest probes performed by lookups",
            metrics.steps.clone(),
        );
        registry.register(
            "degraded",
            "Number of files opened in a degraded state",
            metrics.degraded.clone(),
        );
        metrics
    }
}
