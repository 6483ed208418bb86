//! Statements for the single item endpoints: lookup, create, update and delete.
//!
//! Items are addressed by the resource's lookup field, the primary key unless configured
//! otherwise.

use query_engine_metadata::metadata::ResourceSchema;
use query_engine_sql::sql;
use query_engine_sql::sql::string::Param;

use super::error::{Error, QueryError, QueryErrors};
use super::query::values;

/// A JSON object sent as a request body.
pub type Body = serde_json::Map<String, serde_json::Value>;

/// Convert a path segment to a value of the lookup field. Textual lookup fields take the
/// segment as is; any other lookup field expects an integer.
pub fn translate_lookup_value(schema: &ResourceSchema, raw: &str) -> Result<Param, Error> {
    let field = schema.lookup_field();
    if schema.is_textual(field) {
        Ok(Param::Text(raw.to_string()))
    } else {
        raw.parse()
            .map(Param::Integer)
            .map_err(|_| Error::InvalidLookup(field.to_string()))
    }
}

fn lookup_where(schema: &ResourceSchema, field: &str, value: Param) -> sql::ast::Where {
    sql::ast::Where(sql::helpers::binary_operation(
        sql::helpers::table_column(schema.table(), field),
        sql::ast::BinaryOperator::Equals,
        sql::helpers::parameter(value),
    ))
}

/// `SELECT "<table>".* FROM "<table>" WHERE "<table>"."<field>" = ? LIMIT 1`
pub fn translate_get_by(schema: &ResourceSchema, field: &str, value: Param) -> sql::ast::Select {
    let mut select = sql::helpers::star_select(schema.table());
    select.where_ = lookup_where(schema, field, value);
    select.limit = sql::ast::Limit {
        limit: Some(1),
        offset: None,
    };
    select
}

/// Fetch one item by the raw path segment.
pub fn translate_get(schema: &ResourceSchema, raw: &str) -> Result<sql::ast::Select, Error> {
    let value = translate_lookup_value(schema, raw)?;
    Ok(translate_get_by(schema, schema.lookup_field(), value))
}

/// Every key of the body must be a field of the resource.
fn translate_body(
    schema: &ResourceSchema,
    body: &Body,
) -> Result<Vec<(sql::ast::ColumnName, sql::ast::Expression)>, Error> {
    let mut columns = vec![];
    let mut errors = QueryErrors::default();
    for (key, value) in body {
        match schema.field_type(key) {
            None => errors.extend([QueryError::InvalidBodyField(key.clone())]),
            Some(field_type) => columns.push((
                sql::ast::ColumnName(key.clone()),
                sql::helpers::parameter(values::translate_json_value(Some(field_type), value)),
            )),
        }
    }
    if errors.is_empty() {
        Ok(columns)
    } else {
        Err(Error::Validation(errors))
    }
}

/// Insert a new item, returning the stored row where the flavor allows it.
pub fn translate_insert(schema: &ResourceSchema, body: &Body) -> Result<sql::ast::Insert, Error> {
    let (columns, values) = translate_body(schema, body)?.into_iter().unzip();
    Ok(sql::ast::Insert {
        table: sql::ast::TableName(schema.table().to_string()),
        columns,
        values,
        returning: Some(sql::ast::SelectList::SelectStar),
    })
}

/// Update an item. `None` when the body sets nothing.
pub fn translate_update(
    schema: &ResourceSchema,
    raw: &str,
    body: &Body,
) -> Result<Option<sql::ast::Update>, Error> {
    let value = translate_lookup_value(schema, raw)?;
    let set = translate_body(schema, body)?;
    if set.is_empty() {
        return Ok(None);
    }
    Ok(Some(sql::ast::Update {
        table: sql::ast::TableName(schema.table().to_string()),
        set,
        where_: lookup_where(schema, schema.lookup_field(), value),
    }))
}

pub fn translate_delete(schema: &ResourceSchema, raw: &str) -> Result<sql::ast::Delete, Error> {
    let value = translate_lookup_value(schema, raw)?;
    Ok(sql::ast::Delete {
        from: sql::ast::TableName(schema.table().to_string()),
        where_: lookup_where(schema, schema.lookup_field(), value),
    })
}
