//! Execute rendered statements against the database.

use async_trait::async_trait;
use indexmap::IndexMap;
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};
use tracing::{info_span, Instrument};

use query_engine_sql::sql::string::{Flavor, Param, SQL};

use crate::error::Error;
use crate::metrics::Metrics;

/// A row as returned to clients: column names in select order.
pub type Row = IndexMap<String, serde_json::Value>;

/// What a statement without a result set did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome {
    pub rows_affected: u64,
    /// The generated key of an inserted row, for drivers that report one.
    pub last_insert_id: Option<i64>,
}

/// The persistence layer the server talks to.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// The flavor statements must be rendered in.
    fn flavor(&self) -> Flavor;

    /// Run a statement and return its rows in order.
    async fn fetch_rows(&self, query: SQL) -> Result<Vec<Row>, Error>;

    /// Run a statement for its effect.
    async fn execute(&self, statement: SQL) -> Result<MutationOutcome, Error>;

    /// Refresh the metrics that can only be polled, such as the state of a connection pool.
    fn update_metrics(&self, _metrics: &Metrics) {}
}

/// A [`QueryExecutor`] backed by a sqlx connection pool.
#[derive(Debug, Clone)]
pub struct SqlxExecutor {
    pool: sqlx::AnyPool,
    flavor: Flavor,
}

impl SqlxExecutor {
    pub fn new(pool: sqlx::AnyPool, flavor: Flavor) -> Self {
        SqlxExecutor { pool, flavor }
    }

    pub fn pool(&self) -> &sqlx::AnyPool {
        &self.pool
    }
}

#[async_trait]
impl QueryExecutor for SqlxExecutor {
    fn flavor(&self) -> Flavor {
        self.flavor
    }

    async fn fetch_rows(&self, query: SQL) -> Result<Vec<Row>, Error> {
        tracing::info!(generated_sql = query.sql, params = ?&query.params);

        let rows = build_query_with_params(&query)
            .fetch_all(&self.pool)
            .instrument(info_span!("Database request"))
            .await?;

        async { rows.iter().map(decode_row).collect() }
            .instrument(info_span!("Decode rows"))
            .await
    }

    async fn execute(&self, statement: SQL) -> Result<MutationOutcome, Error> {
        tracing::info!(generated_sql = statement.sql, params = ?&statement.params);

        let result = build_query_with_params(&statement)
            .execute(&self.pool)
            .instrument(info_span!("Database request"))
            .await?;

        Ok(MutationOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        })
    }

    fn update_metrics(&self, metrics: &Metrics) {
        metrics.update_pool_metrics(&self.pool);
    }
}

/// Create a sqlx query from our SQL and bind its parameters in order.
fn build_query_with_params(
    query: &SQL,
) -> sqlx::query::Query<'_, sqlx::Any, sqlx::any::AnyArguments<'_>> {
    query
        .params
        .iter()
        .fold(sqlx::query(query.sql.as_str()), |sqlx_query, param| match param {
            Param::Text(s) => sqlx_query.bind(s.clone()),
            Param::Integer(i) => sqlx_query.bind(*i),
            Param::Float(f) => sqlx_query.bind(*f),
            Param::Boolean(b) => sqlx_query.bind(*b),
            Param::Null => sqlx_query.bind(Option::<String>::None),
        })
}

/// Decode every column of a row into JSON, keeping the select order.
fn decode_row(row: &sqlx::any::AnyRow) -> Result<Row, Error> {
    row.columns()
        .iter()
        .map(|column| {
            let index = column.ordinal();
            Ok::<_, Error>((column.name().to_string(), decode_value(row, index)?))
        })
        .collect()
}

/// Values are decoded by what the driver reports, trying the wider types first.
fn decode_value(row: &sqlx::any::AnyRow, index: usize) -> Result<serde_json::Value, Error> {
    let raw = row.try_get_raw(index)?;
    let type_info = raw.type_info();
    // The any driver only marks NULL through the kind of the value.
    if type_info.is_null() {
        return Ok(serde_json::Value::Null);
    }
    let type_name = type_info.name().to_string();

    if let Ok(value) = row.try_get::<i64, _>(index) {
        return Ok(serde_json::Value::from(value));
    }
    if let Ok(value) = row.try_get::<f64, _>(index) {
        return Ok(serde_json::Number::from_f64(value)
            .map_or(serde_json::Value::Null, serde_json::Value::Number));
    }
    if let Ok(value) = row.try_get::<String, _>(index) {
        return Ok(serde_json::Value::String(value));
    }
    if let Ok(value) = row.try_get::<bool, _>(index) {
        return Ok(serde_json::Value::Bool(value));
    }

    Err(Error::DB(sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: format!("unsupported column type {type_name}").into(),
    }))
}
