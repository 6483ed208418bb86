//! Metrics setup and update for the server.

use prometheus::core::{AtomicI64, AtomicU64, GenericCounter, GenericGauge};

#[derive(Debug, Clone)]
pub struct Metrics {
    pub query_total: GenericCounter<AtomicU64>,
    pub query_rejected_total: GenericCounter<AtomicU64>,
    pub query_failed_total: GenericCounter<AtomicU64>,
    pub mutation_total: GenericCounter<AtomicU64>,
    pub pool_size: GenericGauge<AtomicI64>,
    pub pool_idle_count: GenericGauge<AtomicI64>,
    pub pool_active_count: GenericGauge<AtomicI64>,
    pub pool_max_connections: GenericGauge<AtomicI64>,
}

impl Metrics {
    /// Create the metrics and register them with the provided Prometheus Registry.
    pub fn initialize(
        metrics_registry: &mut prometheus::Registry,
    ) -> Result<Metrics, prometheus::Error> {
        let query_total = add_int_counter_metric(
            metrics_registry,
            "drilldown_query_total",
            "Total successful list queries.",
        )?;

        let query_rejected_total = add_int_counter_metric(
            metrics_registry,
            "drilldown_query_rejected_total",
            "Total list queries rejected because of invalid query parameters.",
        )?;

        let query_failed_total = add_int_counter_metric(
            metrics_registry,
            "drilldown_query_failed_total",
            "Total requests that failed while talking to the database.",
        )?;

        let mutation_total = add_int_counter_metric(
            metrics_registry,
            "drilldown_mutation_total",
            "Total successful inserts, updates and deletes.",
        )?;

        let pool_size = add_int_gauge_metric(
            metrics_registry,
            "drilldown_pool_size",
            "The number of connections currently active. This includes idle connections.",
        )?;

        let pool_idle_count = add_int_gauge_metric(
            metrics_registry,
            "drilldown_pool_idle",
            "The number of connections active and idle (not in use).",
        )?;

        let pool_active_count = add_int_gauge_metric(
            metrics_registry,
            "drilldown_pool_active",
            "The number of connections current active. This does not include idle connections.",
        )?;

        let pool_max_connections = add_int_gauge_metric(
            metrics_registry,
            "drilldown_pool_max_connections",
            "The maximum number of connections that this pool should maintain.",
        )?;

        Ok(Metrics {
            query_total,
            query_rejected_total,
            query_failed_total,
            mutation_total,
            pool_size,
            pool_idle_count,
            pool_active_count,
            pool_max_connections,
        })
    }

    /// Copy the current state of the connection pool into the gauges.
    pub fn update_pool_metrics(&self, pool: &sqlx::AnyPool) {
        let pool_size: i64 = pool.size().into();
        self.pool_size.set(pool_size);

        let pool_idle = i64::try_from(pool.num_idle()).unwrap_or(i64::MAX);
        self.pool_idle_count.set(pool_idle);

        self.pool_active_count.set(pool_size - pool_idle);

        let max_connections: i64 = pool.options().get_max_connections().into();
        self.pool_max_connections.set(max_connections);
    }
}

/// Create a new int counter metric and register it with the provided Prometheus Registry
fn add_int_counter_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericCounter<AtomicU64>, prometheus::Error> {
    let int_counter =
        prometheus::IntCounter::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_counter.clone()))?;
    Ok(int_counter)
}

/// Create a new int gauge metric and register it with the provided Prometheus Registry
fn add_int_gauge_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericGauge<AtomicI64>, prometheus::Error> {
    let int_gauge =
        prometheus::IntGauge::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_gauge.clone()))?;
    Ok(int_gauge)
}
