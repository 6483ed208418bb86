//! Translate the query parameters of a list request into an execution plan.

pub mod fields;
pub mod filtering;
pub mod helpers;
pub mod pagination;
pub mod sorting;
pub mod spec;
pub mod values;

use std::sync::Arc;

use query_engine_metadata::metadata::ResourceSchema;
use query_engine_sql::sql;

use crate::translation::error::{Error, QueryError, QueryErrors};
pub use spec::QuerySpec;

/// Definition of an execution plan to be run against the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// The resource the plan reads from.
    pub resource: String,
    pub query: sql::ast::Select,
}

impl ExecutionPlan {
    /// Render the statement for a SQL flavor.
    pub fn query_sql(&self, flavor: sql::string::Flavor) -> sql::string::SQL {
        let mut sql = sql::string::SQL::new(flavor);
        self.query.to_sql(&mut sql);
        sql
    }
}

/// Translate a list request into an execution plan.
///
/// The fields, conditions and order are compiled concurrently, one task each. Their results are
/// awaited per task and consumed in that fixed order, so errors are always reported as
/// projection errors, then condition errors, then order errors, then window errors.
pub async fn translate(
    schema: Arc<ResourceSchema>,
    query: Arc<QuerySpec>,
) -> Result<ExecutionPlan, Error> {
    let fields_task = tokio::spawn({
        let (schema, query) = (schema.clone(), query.clone());
        async move { fields::translate_fields(&schema, query.get("fields")) }
    });
    let conditions_task = tokio::spawn({
        let (schema, query) = (schema.clone(), query.clone());
        async move { filtering::translate_conditions(&schema, &query) }
    });
    let order_task = tokio::spawn({
        let (schema, query) = (schema.clone(), query.clone());
        async move { sorting::translate_order_by(&schema, query.get("order")) }
    });

    let (fields, conditions, order) = tokio::join!(fields_task, conditions_task, order_task);
    let fields = fields.map_err(|err| Error::Internal(err.to_string()))?;
    let conditions = conditions.map_err(|err| Error::Internal(err.to_string()))?;
    let order = order.map_err(|err| Error::Internal(err.to_string()))?;
    let window = pagination::translate_window(&query);

    let mut errors = QueryErrors::default();
    let fields = collect(fields, &mut errors);
    let conditions = collect(conditions, &mut errors);
    let order = collect(order, &mut errors);
    let window = collect(window, &mut errors);

    match (fields, conditions, order, window) {
        (Some(fields), Some(conditions), Some(order), Some(window)) if errors.is_empty() => {
            let mut joins = vec![];
            helpers::merge_joins(&mut joins, fields.joins);
            helpers::merge_joins(&mut joins, conditions.joins);
            helpers::merge_joins(&mut joins, order.joins);

            let mut select = sql::helpers::simple_select(schema.table(), fields.select_list);
            select.joins = joins;
            select.where_ = sql::ast::Where(conditions.expression);
            select.order_by = order.order_by;
            select.limit = window;

            Ok(ExecutionPlan {
                resource: schema.name().to_string(),
                query: select,
            })
        }
        _ => {
            tracing::info!(resource = schema.name(), %errors, "query rejected");
            Err(Error::Validation(errors))
        }
    }
}

fn collect<T>(result: Result<T, Vec<QueryError>>, errors: &mut QueryErrors) -> Option<T> {
    match result {
        Ok(plan) => Some(plan),
        Err(stage_errors) => {
            errors.extend(stage_errors);
            None
        }
    }
}
