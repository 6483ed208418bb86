//! Transient state used by the server.
//!
//! This is initialized on startup.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info_span, Instrument};

use drilldown_configuration::{Configuration, PoolSettings};
use query_engine_execution::metrics;
use query_engine_execution::query::{QueryExecutor, SqlxExecutor};
use query_engine_metadata::metadata::Metadata;
use query_engine_sql::sql::string::Flavor;

/// State for our server.
#[derive(Clone)]
pub struct State {
    pub metadata: Arc<Metadata>,
    pub executor: Arc<dyn QueryExecutor>,
    pub metrics: metrics::Metrics,
    pub metrics_registry: prometheus::Registry,
}

impl State {
    /// Wrap an executor in a State, registering our metrics with the registry.
    pub fn new(
        metadata: Metadata,
        executor: Arc<dyn QueryExecutor>,
        mut metrics_registry: prometheus::Registry,
    ) -> Result<State, InitializationError> {
        let metrics = metrics::Metrics::initialize(&mut metrics_registry)
            .map_err(InitializationError::MetricsError)?;
        Ok(State {
            metadata: Arc::new(metadata),
            executor,
            metrics,
            metrics_registry,
        })
    }
}

/// Create a connection pool and wrap it inside a State.
pub async fn create_state(
    configuration: Configuration,
    metrics_registry: prometheus::Registry,
) -> Result<State, InitializationError> {
    let (pool, flavor) = async {
        create_pool(&configuration.connection_uri, &configuration.pool_settings).await
    }
    .instrument(info_span!("Create connection pool"))
    .await?;

    let executor = Arc::new(SqlxExecutor::new(pool, flavor));
    async { State::new(configuration.metadata, executor, metrics_registry) }
        .instrument(info_span!("Setup metrics"))
        .await
}

/// Create a connection pool with the given settings. The flavor statements are rendered in
/// follows the scheme of the connection URI.
pub async fn create_pool(
    connection_uri: &str,
    pool_settings: &PoolSettings,
) -> Result<(sqlx::AnyPool, Flavor), InitializationError> {
    let flavor = Flavor::from_connection_uri(connection_uri).ok_or_else(|| {
        let scheme = connection_uri.split(':').next().unwrap_or_default();
        InitializationError::UnsupportedConnectionUri(scheme.to_string())
    })?;

    sqlx::any::install_default_drivers();
    let pool = sqlx::any::AnyPoolOptions::new()
        .max_connections(pool_settings.max_connections)
        .acquire_timeout(Duration::from_secs(pool_settings.pool_timeout))
        .idle_timeout(pool_settings.idle_timeout.map(Duration::from_secs))
        .max_lifetime(pool_settings.connection_lifetime.map(Duration::from_secs))
        .connect(connection_uri)
        .await
        .map_err(InitializationError::UnableToCreatePool)?;

    tracing::info!(?flavor, "connected to the database");
    Ok((pool, flavor))
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("unable to initialize connection pool: {0}")]
    UnableToCreatePool(sqlx::Error),
    #[error("error initializing metrics: {0}")]
    MetricsError(prometheus::Error),
    #[error("unsupported database in connection URI: '{0}'")]
    UnsupportedConnectionUri(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unknown_schemes() {
        let result = create_pool("oracle://db.example.com", &PoolSettings::default()).await;
        assert!(matches!(
            result,
            Err(InitializationError::UnsupportedConnectionUri(scheme)) if scheme == "oracle"
        ));
    }
}
