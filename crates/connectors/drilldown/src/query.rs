//! Plan and execute the requests of every endpoint.

use std::sync::Arc;

use tracing::{info_span, Instrument};

use query_engine_execution::error as execution;
use query_engine_execution::query::Row;
use query_engine_metadata::metadata::ResourceSchema;
use query_engine_sql::sql;
use query_engine_sql::sql::string::Param;
use query_engine_translation::translation::error as translation;
use query_engine_translation::translation::item::{self, Body};
use query_engine_translation::translation::query::{self, values, QuerySpec};

use crate::error::ServerError;
use crate::state::State;

pub const RECORD_NOT_FOUND: &str = "Record not found!";

fn lookup_resource(state: &State, resource: &str) -> Result<Arc<ResourceSchema>, ServerError> {
    state
        .metadata
        .lookup_resource(resource)
        .cloned()
        .ok_or_else(|| ServerError::NotFound(format!("Unknown resource: {resource}")))
}

/// Count failures of the database before handing them on.
fn database_error(state: &State, error: execution::Error) -> ServerError {
    if let execution::Error::DB(err) = &error {
        tracing::error!(
            meta.signal_type = "log",
            event.name = "Database error",
            body = %err,
            error = true,
        );
        state.metrics.query_failed_total.inc();
    }
    error.into()
}

/// Render a statement in the flavor of the executor.
fn render(state: &State, to_sql: impl FnOnce(&mut sql::string::SQL)) -> sql::string::SQL {
    let mut sql = sql::string::SQL::new(state.executor.flavor());
    to_sql(&mut sql);
    sql
}

/// List the rows of a resource matching the query string.
pub async fn list(
    state: &State,
    resource: &str,
    spec: QuerySpec,
) -> Result<Vec<Row>, ServerError> {
    let schema = lookup_resource(state, resource)?;

    // Compile the query.
    let plan = async {
        query::translate(schema, Arc::new(spec))
            .await
            .map_err(|err| {
                if matches!(err, translation::Error::Validation(_)) {
                    state.metrics.query_rejected_total.inc();
                }
                ServerError::from(err)
            })
    }
    .instrument(info_span!("Plan query", resource))
    .await?;

    // Execute the query.
    let rows = state
        .executor
        .fetch_rows(plan.query_sql(state.executor.flavor()))
        .instrument(info_span!("Execute query", resource))
        .await
        .map_err(|err| database_error(state, err))?;

    // assuming query succeeded, increment counter
    state.metrics.query_total.inc();

    Ok(rows)
}

async fn fetch_one(state: &State, query: sql::string::SQL) -> Result<Option<Row>, ServerError> {
    let rows = state
        .executor
        .fetch_rows(query)
        .await
        .map_err(|err| database_error(state, err))?;
    Ok(rows.into_iter().next())
}

async fn require_existing(
    state: &State,
    schema: &ResourceSchema,
    lookup: &str,
) -> Result<Row, ServerError> {
    let select = item::translate_get(schema, lookup)?;
    fetch_one(state, render(state, |sql| select.to_sql(sql)))
        .await?
        .ok_or_else(|| ServerError::NotFound(RECORD_NOT_FOUND.to_string()))
}

/// Fetch one row by its lookup field.
pub async fn get(state: &State, resource: &str, lookup: &str) -> Result<Row, ServerError> {
    let schema = lookup_resource(state, resource)?;
    require_existing(state, &schema, lookup)
        .instrument(info_span!("Get item", resource))
        .await
}

/// Insert a row and return it as stored.
pub async fn create(state: &State, resource: &str, body: Body) -> Result<Row, ServerError> {
    let schema = lookup_resource(state, resource)?;
    let insert = item::translate_insert(&schema, &body)?;

    let row = async {
        if state.executor.flavor().supports_returning() {
            fetch_one(state, render(state, |sql| insert.to_sql(sql))).await
        } else {
            let outcome = state
                .executor
                .execute(render(state, |sql| insert.to_sql(sql)))
                .await
                .map_err(|err| database_error(state, err))?;
            let key = match body.get(schema.primary_key()) {
                Some(value) => {
                    values::translate_json_value(schema.field_type(schema.primary_key()), value)
                }
                None => match outcome.last_insert_id {
                    Some(id) => Param::Integer(id),
                    None => return Ok(None),
                },
            };
            let select = item::translate_get_by(&schema, schema.primary_key(), key);
            fetch_one(state, render(state, |sql| select.to_sql(sql))).await
        }
    }
    .instrument(info_span!("Create item", resource))
    .await?;

    state.metrics.mutation_total.inc();
    row.ok_or_else(|| {
        ServerError::Internal(format!(
            "the row inserted into '{resource}' could not be read back"
        ))
    })
}

/// Update the row with the given lookup value.
pub async fn update(
    state: &State,
    resource: &str,
    lookup: &str,
    body: Body,
) -> Result<(), ServerError> {
    let schema = lookup_resource(state, resource)?;
    async {
        require_existing(state, &schema, lookup).await?;
        if let Some(update) = item::translate_update(&schema, lookup, &body)? {
            state
                .executor
                .execute(render(state, |sql| update.to_sql(sql)))
                .await
                .map_err(|err| database_error(state, err))?;
        }
        Ok::<_, ServerError>(())
    }
    .instrument(info_span!("Update item", resource))
    .await?;

    state.metrics.mutation_total.inc();
    Ok(())
}

/// Delete the row with the given lookup value.
pub async fn delete(state: &State, resource: &str, lookup: &str) -> Result<(), ServerError> {
    let schema = lookup_resource(state, resource)?;
    async {
        require_existing(state, &schema, lookup).await?;
        let delete = item::translate_delete(&schema, lookup)?;
        state
            .executor
            .execute(render(state, |sql| delete.to_sql(sql)))
            .await
            .map_err(|err| database_error(state, err))?;
        Ok::<_, ServerError>(())
    }
    .instrument(info_span!("Delete item", resource))
    .await?;

    state.metrics.mutation_total.inc();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::http::StatusCode;

    use query_engine_execution::query::{MutationOutcome, QueryExecutor};
    use query_engine_metadata::metadata::{FieldDescriptor, FieldType, Metadata};
    use query_engine_sql::sql::string::{Flavor, SQL};

    use super::*;

    /// A MySQL database that reports a generated key for every insert and answers every
    /// query with the same row.
    struct MysqlExecutor {
        last_insert_id: Option<i64>,
        statements: Mutex<Vec<SQL>>,
    }

    impl MysqlExecutor {
        fn new(last_insert_id: Option<i64>) -> Arc<MysqlExecutor> {
            Arc::new(MysqlExecutor {
                last_insert_id,
                statements: Mutex::new(vec![]),
            })
        }

        fn statements(&self) -> Vec<(String, Vec<Param>)> {
            self.statements
                .lock()
                .unwrap()
                .iter()
                .map(|statement| (statement.sql.clone(), statement.params.clone()))
                .collect()
        }
    }

    fn stored_row() -> Row {
        Row::from([("title".to_string(), serde_json::json!("Dune"))])
    }

    #[async_trait]
    impl QueryExecutor for MysqlExecutor {
        fn flavor(&self) -> Flavor {
            Flavor::Mysql
        }

        async fn fetch_rows(&self, query: SQL) -> Result<Vec<Row>, execution::Error> {
            self.statements.lock().unwrap().push(query);
            Ok(vec![stored_row()])
        }

        async fn execute(&self, statement: SQL) -> Result<MutationOutcome, execution::Error> {
            self.statements.lock().unwrap().push(statement);
            Ok(MutationOutcome {
                rows_affected: 1,
                last_insert_id: self.last_insert_id,
            })
        }
    }

    fn state(executor: Arc<MysqlExecutor>) -> State {
        let mut metadata = Metadata::empty();
        metadata.register(
            ResourceSchema::new(
                "books",
                "books",
                vec![
                    FieldDescriptor::primary_key("id", FieldType::Integer),
                    FieldDescriptor::new("title", FieldType::Text),
                ],
                None,
                BTreeMap::new(),
            )
            .unwrap(),
        );
        State::new(metadata, executor, prometheus::Registry::new()).unwrap()
    }

    fn body(value: serde_json::Value) -> Body {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn created_rows_are_read_back_by_the_generated_key() {
        let executor = MysqlExecutor::new(Some(7));
        let state = state(executor.clone());

        let row = create(&state, "books", body(serde_json::json!({"title": "Dune"})))
            .await
            .unwrap();
        assert_eq!(row, stored_row());
        assert_eq!(state.metrics.mutation_total.get(), 1);

        let statements = executor.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].0, "INSERT INTO `books` (`title`) VALUES (?)");
        assert_eq!(statements[0].1, vec![Param::Text("Dune".to_string())]);
        assert!(statements[1].0.starts_with("SELECT `books`.* FROM `books`"));
        assert_eq!(statements[1].1, vec![Param::Integer(7)]);
    }

    #[tokio::test]
    async fn created_rows_are_read_back_by_the_key_in_the_body() {
        let executor = MysqlExecutor::new(Some(7));
        let state = state(executor.clone());

        create(
            &state,
            "books",
            body(serde_json::json!({"id": 12, "title": "Dune"})),
        )
        .await
        .unwrap();

        let statements = executor.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].1, vec![Param::Integer(12)]);
    }

    #[tokio::test]
    async fn created_rows_without_a_known_key_are_internal_errors() {
        let executor = MysqlExecutor::new(None);
        let state = state(executor.clone());

        let error = create(&state, "books", body(serde_json::json!({"title": "Dune"})))
            .await
            .unwrap_err();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(executor.statements().len(), 1);
    }
}
