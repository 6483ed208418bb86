//! Translate the `fields` selector into a select list and the joins it needs.

use query_engine_metadata::metadata::ResourceSchema;
use query_engine_sql::sql;

use super::helpers::{self, Target};
use crate::translation::error::QueryError;

/// The projection of a list query.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub select_list: sql::ast::SelectList,
    pub joins: Vec<sql::ast::Join>,
}

/// Translate the comma separated `fields` selector.
///
/// Without a selector every column of the resource is returned. Otherwise the fields are
/// selected in the requested order and the primary key is placed last, exactly once. A dotted
/// `relation.field` token selects a column of a related table under the alias
/// `<relation alias>.<field>` and joins that table.
///
/// Every invalid token is reported, in the order the tokens were given.
pub fn translate_fields(
    schema: &ResourceSchema,
    selector: Option<&str>,
) -> Result<SelectPlan, Vec<QueryError>> {
    let selector = match selector {
        None | Some("") => {
            return Ok(SelectPlan {
                select_list: sql::ast::SelectList::SelectStarFrom(sql::ast::TableName(
                    schema.table().to_string(),
                )),
                joins: vec![],
            })
        }
        Some(selector) => selector,
    };

    let mut columns = vec![];
    let mut joins = vec![];
    let mut errors = vec![];

    for token in selector.split(',') {
        if token == schema.primary_key() {
            continue;
        }
        match helpers::resolve(schema, token) {
            None => errors.push(QueryError::InvalidSelectorField(token.to_string())),
            Some(target) => {
                let alias = match &target {
                    Target::Column { name, .. } => (*name).to_string(),
                    Target::Related { relation, field } => format!("{}.{field}", relation.alias),
                };
                columns.push((
                    sql::helpers::make_column_alias(alias),
                    target.expression(schema),
                ));
                helpers::merge_joins(&mut joins, target.join(schema));
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    columns.push(sql::helpers::make_column(schema.table(), schema.primary_key()));

    Ok(SelectPlan {
        select_list: sql::ast::SelectList::SelectList(columns),
        joins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_metadata::metadata::{FieldDescriptor, FieldType, Relation};
    use std::collections::BTreeMap;

    fn books() -> ResourceSchema {
        ResourceSchema::new(
            "books",
            "books",
            vec![
                FieldDescriptor::primary_key("id", FieldType::Integer),
                FieldDescriptor::new("title", FieldType::Text),
                FieldDescriptor::new("pages", FieldType::Integer),
                FieldDescriptor::new("author_id", FieldType::Integer),
            ],
            None,
            BTreeMap::from([("authors".to_string(), Relation::conventional("authors"))]),
        )
        .unwrap()
    }

    fn aliases(plan: &SelectPlan) -> Vec<String> {
        match &plan.select_list {
            sql::ast::SelectList::SelectList(columns) => {
                columns.iter().map(|(alias, _)| alias.name.clone()).collect()
            }
            other => panic!("expected a select list, got {other:?}"),
        }
    }

    #[test]
    fn no_selector_selects_every_column() {
        let plan = translate_fields(&books(), None).unwrap();
        assert_eq!(
            plan.select_list,
            sql::ast::SelectList::SelectStarFrom(sql::ast::TableName("books".to_string()))
        );
        assert_eq!(translate_fields(&books(), Some("")).unwrap(), plan);
    }

    #[test]
    fn primary_key_is_appended_last_once() {
        let plan = translate_fields(&books(), Some("title,pages")).unwrap();
        assert_eq!(aliases(&plan), vec!["title", "pages", "id"]);

        let plan = translate_fields(&books(), Some("id,title,id")).unwrap();
        assert_eq!(aliases(&plan), vec!["title", "id"]);
        assert!(plan.joins.is_empty());
    }

    #[test]
    fn related_fields_are_joined_and_aliased() {
        let plan = translate_fields(&books(), Some("title,authors.name,author.id")).unwrap();
        assert_eq!(aliases(&plan), vec!["title", "author.name", "author.id", "id"]);
        assert_eq!(
            plan.joins,
            vec![sql::helpers::left_join("authors", "id", "books", "author_id")]
        );
    }

    #[test]
    fn reports_every_invalid_token_in_order() {
        let errors = translate_fields(
            &books(),
            Some("title,publisher,genri,publishers.name,authors.name.first"),
        )
        .unwrap_err();
        assert_eq!(
            errors,
            vec![
                QueryError::InvalidSelectorField("publisher".to_string()),
                QueryError::InvalidSelectorField("genri".to_string()),
                QueryError::InvalidSelectorField("publishers.name".to_string()),
                QueryError::InvalidSelectorField("authors.name.first".to_string()),
            ]
        );
    }
}
