//! Health check endpoint for the server.

use query_engine_sql::sql::string::SQL;

use crate::error::ServerError;
use crate::state::State;

/// Check the health of the server.
///
/// This runs a trivial query against the database.
pub async fn health_check(state: &State) -> Result<(), ServerError> {
    let mut sql = SQL::new(state.executor.flavor());
    sql.append_syntax("SELECT 1");
    let rows = state.executor.fetch_rows(sql).await?;
    if rows.len() == 1 {
        Ok(())
    } else {
        Err(ServerError::Internal(format!(
            "health check returned {} rows",
            rows.len()
        )))
    }
}
