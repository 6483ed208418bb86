//! Translate the filtering query parameters into a WHERE expression.

use enum_iterator::Sequence;

use query_engine_metadata::metadata::ResourceSchema;
use query_engine_sql::sql;
use query_engine_sql::sql::string::Param;

use super::helpers::{self, Target};
use super::spec::QuerySpec;
use super::values;
use crate::translation::error::QueryError;

/// Separates a field from its operator suffix, as in `pages__gte`.
pub const OPERATOR_SEPARATOR: &str = "__";

/// The comparisons a condition can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    StartsWith,
    EndsWith,
    Contains,
    /// Equality on a field of a related table, written `relation__field`.
    RelationEq,
}

impl Operator {
    /// The key suffix selecting this operator, if it has one.
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Operator::Gt => Some("gt"),
            Operator::Gte => Some("gte"),
            Operator::Lt => Some("lt"),
            Operator::Lte => Some("lte"),
            Operator::StartsWith => Some("startswith"),
            Operator::EndsWith => Some("endswith"),
            Operator::Contains => Some("contains"),
            Operator::Eq | Operator::RelationEq => None,
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Operator> {
        enum_iterator::all::<Operator>().find(|operator| operator.suffix() == Some(suffix))
    }

    /// Build the comparison. Pattern operators wrap the value in `%` wildcards.
    fn compare(self, target: &Target, schema: &ResourceSchema, raw: &str) -> sql::ast::Expression {
        let (operator, param) = match self {
            Operator::Eq | Operator::RelationEq => (
                sql::ast::BinaryOperator::Equals,
                values::translate_raw_value(target.field_type(), raw),
            ),
            Operator::Gt => (
                sql::ast::BinaryOperator::GreaterThan,
                values::translate_raw_value(target.field_type(), raw),
            ),
            Operator::Gte => (
                sql::ast::BinaryOperator::GreaterThanOrEqualTo,
                values::translate_raw_value(target.field_type(), raw),
            ),
            Operator::Lt => (
                sql::ast::BinaryOperator::LessThan,
                values::translate_raw_value(target.field_type(), raw),
            ),
            Operator::Lte => (
                sql::ast::BinaryOperator::LessThanOrEqualTo,
                values::translate_raw_value(target.field_type(), raw),
            ),
            Operator::StartsWith => (
                sql::ast::BinaryOperator::Like,
                Param::Text(format!("{raw}%")),
            ),
            Operator::EndsWith => (
                sql::ast::BinaryOperator::Like,
                Param::Text(format!("%{raw}")),
            ),
            Operator::Contains => (
                sql::ast::BinaryOperator::Like,
                Param::Text(format!("%{raw}%")),
            ),
        };
        sql::helpers::binary_operation(
            target.expression(schema),
            operator,
            sql::helpers::parameter(param),
        )
    }
}

/// A single parsed condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate<'a> {
    pub field: &'a str,
    pub operator: Operator,
    pub value: &'a str,
}

/// The filter of a list query.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionPlan {
    /// The conditions combined with AND. `true` when there are none.
    pub expression: sql::ast::Expression,
    pub joins: Vec<sql::ast::Join>,
    /// The fields named by the conditions, in order.
    pub fields: Vec<String>,
}

/// Split a condition key into the field it names and its operator.
/// `None` when the key has more than one operator suffix.
pub fn parse_predicate<'a>(key: &'a str, value: &'a str) -> Option<Predicate<'a>> {
    let mut parts = key.split(OPERATOR_SEPARATOR);
    let field = parts.next()?;
    let predicate = match (parts.next(), parts.next()) {
        (None, _) => Predicate {
            field,
            operator: Operator::Eq,
            value,
        },
        (Some(suffix), None) => Predicate {
            field,
            operator: Operator::from_suffix(suffix).unwrap_or(Operator::RelationEq),
            value,
        },
        (Some(_), Some(_)) => return None,
    };
    Some(predicate)
}

/// Translate every non reserved query key into a condition.
///
/// - `field=v` and `relation.field=v` compare for equality.
/// - `field__<op>=v` use the operator named by the suffix.
/// - `relation__field=v` compares a field of the related table for equality.
///
/// Every value is bound as a parameter. Every invalid field is reported, in key order.
pub fn translate_conditions(
    schema: &ResourceSchema,
    query: &QuerySpec,
) -> Result<ConditionPlan, Vec<QueryError>> {
    let mut expression = sql::helpers::true_expr();
    let mut joins = vec![];
    let mut fields = vec![];
    let mut errors = vec![];

    for (key, value) in query.conditions() {
        let Some(predicate) = parse_predicate(key, value) else {
            errors.push(QueryError::InvalidConditionField(key.to_string()));
            continue;
        };

        let target = match predicate.operator {
            Operator::RelationEq => {
                match key.split_once(OPERATOR_SEPARATOR) {
                    Some((_, field)) if !field.is_empty() => {
                        helpers::resolve_related(schema, predicate.field, field)
                    }
                    _ => None,
                }
            }
            _ => helpers::resolve(schema, predicate.field),
        };

        match target {
            None => errors.push(QueryError::InvalidConditionField(
                predicate.field.to_string(),
            )),
            Some(target) => {
                let comparison = predicate
                    .operator
                    .compare(&target, schema, predicate.value);
                expression = sql::helpers::and_expr(expression, comparison);
                helpers::merge_joins(&mut joins, target.join(schema));
                fields.push(predicate.field.to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(ConditionPlan {
            expression,
            joins,
            fields,
        })
    } else {
        Err(errors)
    }
}
