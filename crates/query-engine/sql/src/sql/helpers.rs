//! Helpers for building sql::ast types in certain shapes and patterns.

use super::ast::*;
use super::string::Param;

// Empty clauses //

/// An empty `ORDER BY` clause.
pub fn empty_order_by() -> OrderBy {
    OrderBy { elements: vec![] }
}

/// Empty `LIMIT` and `OFFSET` clauses.
pub fn empty_limit() -> Limit {
    Limit {
        limit: None,
        offset: None,
    }
}

/// A `true` expression, which is also an empty `WHERE` clause.
pub fn true_expr() -> Expression {
    Expression::Value(Value::Bool(true))
}

// Expressions //

/// Generate a column expression refering to a specific table.
pub fn table_column(table: &str, name: &str) -> Expression {
    Expression::ColumnReference(ColumnReference::TableColumn {
        table: TableName(table.to_string()),
        name: ColumnName(name.to_string()),
    })
}

/// A value bound as a positional parameter.
pub fn parameter(param: Param) -> Expression {
    Expression::Value(Value::Parameter(param))
}

pub fn binary_operation(left: Expression, operator: BinaryOperator, right: Expression) -> Expression {
    Expression::BinaryOperation {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}

/// Combine two expressions with AND. `true` on either side is dropped.
pub fn and_expr(left: Expression, right: Expression) -> Expression {
    if left == true_expr() {
        right
    } else if right == true_expr() {
        left
    } else {
        Expression::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

// Aliasing //

/// Create column aliases using this function so we build everything in one place.
pub fn make_column_alias(name: String) -> ColumnAlias {
    ColumnAlias { name }
}

/// A same-table column, selected under its own name.
pub fn make_column(table: &str, name: &str) -> (ColumnAlias, Expression) {
    (make_column_alias(name.to_string()), table_column(table, name))
}

// Joins //

/// `LEFT OUTER JOIN "<related>" ON "<related>"."<references>" = "<table>"."<foreign_key>"`
pub fn left_join(related: &str, references: &str, table: &str, foreign_key: &str) -> Join {
    Join::LeftOuterJoin(LeftOuterJoin {
        table: TableName(related.to_string()),
        on: binary_operation(
            table_column(related, references),
            BinaryOperator::Equals,
            table_column(table, foreign_key),
        ),
    })
}

// SELECTs //

/// Build a select with a select list from a table, the rest are empty.
pub fn simple_select(table: &str, select_list: SelectList) -> Select {
    Select {
        select_list,
        from: Some(From::Table {
            name: TableName(table.to_string()),
        }),
        joins: vec![],
        where_: Where(true_expr()),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}

/// Build a simple `SELECT "<table>".* FROM "<table>"`.
pub fn star_select(table: &str) -> Select {
    simple_select(table, SelectList::SelectStarFrom(TableName(table.to_string())))
}
