//! Translate the `order` query parameter into an ORDER BY clause.

use query_engine_metadata::metadata::ResourceSchema;
use query_engine_sql::sql;

use super::helpers;
use crate::translation::error::QueryError;

/// The ordering of a list query.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlan {
    pub order_by: sql::ast::OrderBy,
    pub joins: Vec<sql::ast::Join>,
}

/// Convert the comma separated `order` parameter to a SQL ORDER BY clause, and the JOINs
/// needed when we order by related fields. A leading `-` sorts descending. The first field
/// is the primary sort key.
pub fn translate_order_by(
    schema: &ResourceSchema,
    order: Option<&str>,
) -> Result<OrderPlan, Vec<QueryError>> {
    let mut elements = vec![];
    let mut joins = vec![];
    let mut errors = vec![];

    for token in order.unwrap_or_default().split(',') {
        if token.is_empty() {
            continue;
        }
        let (field, direction) = match token.strip_prefix('-') {
            Some(field) => (field, sql::ast::OrderByDirection::Desc),
            None => (token, sql::ast::OrderByDirection::Asc),
        };
        match helpers::resolve(schema, field) {
            None => errors.push(QueryError::InvalidOrderField(field.to_string())),
            Some(target) => {
                elements.push(sql::ast::OrderByElement {
                    target: target.expression(schema),
                    direction,
                });
                helpers::merge_joins(&mut joins, target.join(schema));
            }
        }
    }

    if errors.is_empty() {
        Ok(OrderPlan {
            order_by: sql::ast::OrderBy { elements },
            joins,
        })
    } else {
        Err(errors)
    }
}
