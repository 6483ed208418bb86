//! Resolve the field references found in query parameters.

use query_engine_metadata::metadata::{FieldType, Relation, ResourceSchema};
use query_engine_sql::sql;

/// A field reference resolved against the schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Target<'a> {
    /// A column of the resource table.
    Column { name: &'a str, r#type: FieldType },
    /// A column of a related table, reached through a join.
    Related {
        relation: &'a Relation,
        field: &'a str,
    },
}

impl Target<'_> {
    /// The qualified column expression.
    pub fn expression(&self, schema: &ResourceSchema) -> sql::ast::Expression {
        match self {
            Target::Column { name, .. } => sql::helpers::table_column(schema.table(), name),
            Target::Related { relation, field } => {
                sql::helpers::table_column(&relation.table, field)
            }
        }
    }

    /// The join needed to reach the column, if any.
    pub fn join(&self, schema: &ResourceSchema) -> Option<sql::ast::Join> {
        match self {
            Target::Column { .. } => None,
            Target::Related { relation, .. } => Some(relation_join(schema, relation)),
        }
    }

    /// The declared type. Related fields are not described by this schema.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Target::Column { r#type, .. } => Some(*r#type),
            Target::Related { .. } => None,
        }
    }
}

/// Resolve either a bare field name or a dotted `relation.field` reference.
/// The relation may be named by its name or its alias. The related field itself is
/// not checked, there is no schema for it.
pub fn resolve<'a>(schema: &'a ResourceSchema, reference: &'a str) -> Option<Target<'a>> {
    match reference.split_once('.') {
        None => schema.field_type(reference).map(|r#type| Target::Column {
            name: reference,
            r#type,
        }),
        Some((relation, field)) if !field.is_empty() && !field.contains('.') => {
            resolve_related(schema, relation, field)
        }
        Some(_) => None,
    }
}

/// Resolve a relation and a field on it.
pub fn resolve_related<'a>(
    schema: &'a ResourceSchema,
    relation: &str,
    field: &'a str,
) -> Option<Target<'a>> {
    schema
        .relation(relation)
        .map(|relation| Target::Related { relation, field })
}

/// `LEFT OUTER JOIN "<related>" ON "<related>"."<references>" = "<table>"."<foreign key>"`
pub fn relation_join(schema: &ResourceSchema, relation: &Relation) -> sql::ast::Join {
    sql::helpers::left_join(
        &relation.table,
        &relation.references,
        schema.table(),
        &relation.foreign_key,
    )
}

/// Append joins, skipping the ones already present.
pub fn merge_joins(
    joins: &mut Vec<sql::ast::Join>,
    more: impl IntoIterator<Item = sql::ast::Join>,
) {
    for join in more {
        if !joins.contains(&join) {
            joins.push(join);
        }
    }
}
