//! Build a router over the seeded database.

use std::sync::Arc;

use drilldown::state::State;
use drilldown_configuration::environment::{FixedEnvironment, Variable};
use drilldown_configuration::version1::DEFAULT_CONNECTION_URI_VARIABLE;
use drilldown_configuration::{make_runtime_configuration, parse_configuration};
use query_engine_execution::query::SqlxExecutor;

use crate::database;
use crate::deployment::{get_path_from_project_root, BOOKS_DEPLOYMENT_PATH};

/// Creates a router with a fresh state and a freshly seeded database.
pub async fn create_router() -> axum::Router {
    drilldown::routes::create_router(create_state().await)
}

/// Creates a fresh state over the books configuration and a freshly seeded database.
pub async fn create_state() -> State {
    let _ = env_logger::builder().is_test(true).try_init();

    let parsed = parse_configuration(get_path_from_project_root(BOOKS_DEPLOYMENT_PATH))
        .await
        .unwrap();
    let environment = FixedEnvironment::from([(
        Variable::from(DEFAULT_CONNECTION_URI_VARIABLE),
        database::SQLITE_CONNECTION_URI.to_string(),
    )]);
    let configuration = make_runtime_configuration(parsed, environment).unwrap();

    let (pool, flavor) = database::create_seeded_pool().await.unwrap();
    State::new(
        configuration.metadata,
        Arc::new(SqlxExecutor::new(pool, flavor)),
        prometheus::Registry::new(),
    )
    .unwrap()
}
