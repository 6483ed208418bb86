//! Convert a SQL AST to a low-level SQL string.

use super::ast::*;
use super::helpers;
use super::string::*;

// Convert to SQL strings

impl Select {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("SELECT ");

        self.select_list.to_sql(sql);

        if let Some(from) = &self.from {
            sql.append_syntax(" ");
            from.to_sql(sql);
        }

        for join in &self.joins {
            join.to_sql(sql);
        }

        self.where_.to_sql(sql);

        self.order_by.to_sql(sql);

        self.limit.to_sql(sql);
    }
}

impl Insert {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("INSERT INTO ");
        self.table.to_sql(sql);

        if self.columns.is_empty() {
            match sql.flavor {
                Flavor::Mysql => sql.append_syntax(" () VALUES ()"),
                Flavor::Postgresql | Flavor::Sqlite => sql.append_syntax(" DEFAULT VALUES"),
            }
        } else {
            sql.append_syntax(" (");
            for (index, column) in self.columns.iter().enumerate() {
                column.to_sql(sql);
                if index < (self.columns.len() - 1) {
                    sql.append_syntax(", ");
                }
            }
            sql.append_syntax(") VALUES (");
            for (index, value) in self.values.iter().enumerate() {
                value.to_sql(sql);
                if index < (self.values.len() - 1) {
                    sql.append_syntax(", ");
                }
            }
            sql.append_syntax(")");
        }

        if let Some(select_list) = &self.returning {
            if sql.flavor.supports_returning() {
                sql.append_syntax(" RETURNING ");
                select_list.to_sql(sql);
            }
        }
    }
}

impl Update {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("UPDATE ");
        self.table.to_sql(sql);
        sql.append_syntax(" SET ");
        for (index, (column, value)) in self.set.iter().enumerate() {
            column.to_sql(sql);
            sql.append_syntax(" = ");
            value.to_sql(sql);
            if index < (self.set.len() - 1) {
                sql.append_syntax(", ");
            }
        }
        self.where_.to_sql(sql);
    }
}

impl Delete {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("DELETE FROM ");
        self.from.to_sql(sql);
        self.where_.to_sql(sql);
    }
}

impl SelectList {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            SelectList::SelectList(select_list) => {
                for (index, (col, expr)) in select_list.iter().enumerate() {
                    expr.to_sql(sql);
                    sql.append_syntax(" AS ");
                    col.to_sql(sql);
                    if index < (select_list.len() - 1) {
                        sql.append_syntax(", ");
                    }
                }
            }
            SelectList::SelectStar => {
                sql.append_syntax("*");
            }
            SelectList::SelectStarFrom(table) => {
                table.to_sql(sql);
                sql.append_syntax(".*");
            }
        }
    }
}

impl From {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("FROM ");
        match &self {
            From::Table { name } => name.to_sql(sql),
        }
    }
}

impl Join {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            Join::LeftOuterJoin(join) => {
                sql.append_syntax(" LEFT OUTER JOIN ");
                join.table.to_sql(sql);
                sql.append_syntax(" ON ");
                join.on.to_sql(sql);
            }
        }
    }
}

impl Where {
    pub fn to_sql(&self, sql: &mut SQL) {
        let Where(expression) = self;
        if *expression != helpers::true_expr() {
            sql.append_syntax(" WHERE ");
            expression.to_sql(sql);
        }
    }
}

// scalars
impl Expression {
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Expression::ColumnReference(column_reference) => column_reference.to_sql(sql),
            Expression::Value(value) => value.to_sql(sql),
            Expression::And { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" AND ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::BinaryOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                operator.to_sql(sql);
                right.to_sql(sql);
                sql.append_syntax(")");
            }
        }
    }
}

impl BinaryOperator {
    pub fn to_sql(self, sql: &mut SQL) {
        match self {
            BinaryOperator::Equals => sql.append_syntax(" = "),
            BinaryOperator::GreaterThan => sql.append_syntax(" > "),
            BinaryOperator::GreaterThanOrEqualTo => sql.append_syntax(" >= "),
            BinaryOperator::LessThan => sql.append_syntax(" < "),
            BinaryOperator::LessThanOrEqualTo => sql.append_syntax(" <= "),
            BinaryOperator::Like => sql.append_syntax(" LIKE "),
        }
    }
}

impl Value {
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Value::Bool(true) => sql.append_syntax("true"),
            Value::Bool(false) => sql.append_syntax("false"),
            Value::Parameter(param) => sql.append_param(param.clone()),
        }
    }
}

impl Limit {
    pub fn to_sql(&self, sql: &mut SQL) {
        if let Some(limit) = self.limit {
            sql.append_syntax(" LIMIT ");
            sql.append_syntax(&limit.to_string());
        }
        if let Some(offset) = self.offset {
            sql.append_syntax(" OFFSET ");
            sql.append_syntax(&offset.to_string());
        }
    }
}

impl OrderBy {
    pub fn to_sql(&self, sql: &mut SQL) {
        if !self.elements.is_empty() {
            sql.append_syntax(" ORDER BY ");
            for (index, order_by_item) in self.elements.iter().enumerate() {
                order_by_item.to_sql(sql);
                if index < (self.elements.len() - 1) {
                    sql.append_syntax(", ");
                }
            }
        }
    }
}

impl OrderByElement {
    pub fn to_sql(&self, sql: &mut SQL) {
        self.target.to_sql(sql);
        self.direction.to_sql(sql);
    }
}

impl OrderByDirection {
    pub fn to_sql(self, sql: &mut SQL) {
        match self {
            OrderByDirection::Asc => sql.append_syntax(" ASC"),
            OrderByDirection::Desc => sql.append_syntax(" DESC"),
        }
    }
}

// names
impl TableName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl ColumnName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl ColumnReference {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            ColumnReference::TableColumn { table, name } => {
                table.to_sql(sql);
                sql.append_syntax(".");
                name.to_sql(sql);
            }
            ColumnReference::Column(name) => name.to_sql(sql),
        }
    }
}

impl ColumnAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn render(flavor: Flavor, f: impl FnOnce(&mut SQL)) -> SQL {
        let mut sql = SQL::new(flavor);
        f(&mut sql);
        sql
    }

    fn books_by_author() -> Select {
        let mut select = helpers::simple_select(
            "books",
            SelectList::SelectList(vec![
                helpers::make_column("books", "title"),
                (
                    helpers::make_column_alias("author.name".to_string()),
                    helpers::table_column("authors", "name"),
                ),
                helpers::make_column("books", "id"),
            ]),
        );
        select.joins = vec![helpers::left_join("authors", "id", "books", "author_id")];
        select.where_ = Where(helpers::and_expr(
            helpers::binary_operation(
                helpers::table_column("authors", "name"),
                BinaryOperator::Equals,
                helpers::parameter(Param::Text("Chuck Palahniuk".to_string())),
            ),
            helpers::binary_operation(
                helpers::table_column("books", "pages"),
                BinaryOperator::GreaterThanOrEqualTo,
                helpers::parameter(Param::Integer(353)),
            ),
        ));
        select.order_by = OrderBy {
            elements: vec![OrderByElement {
                target: helpers::table_column("books", "title"),
                direction: OrderByDirection::Desc,
            }],
        };
        select.limit = Limit {
            limit: Some(20),
            offset: Some(5),
        };
        select
    }

    #[test]
    fn select_with_join_where_order_and_window() {
        let sql = render(Flavor::Postgresql, |sql| books_by_author().to_sql(sql));
        assert_eq!(
            sql.sql,
            r#"SELECT "books"."title" AS "title", "authors"."name" AS "author.name", "books"."id" AS "id" FROM "books" LEFT OUTER JOIN "authors" ON ("authors"."id" = "books"."author_id") WHERE (("authors"."name" = $1) AND ("books"."pages" >= $2)) ORDER BY "books"."title" DESC LIMIT 20 OFFSET 5"#
        );
        assert_eq!(
            sql.params,
            vec![
                Param::Text("Chuck Palahniuk".to_string()),
                Param::Integer(353)
            ]
        );
    }

    #[test]
    fn mysql_quotes_with_backticks() {
        let sql = render(Flavor::Mysql, |sql| books_by_author().to_sql(sql));
        assert_eq!(
            sql.sql,
            "SELECT `books`.`title` AS `title`, `authors`.`name` AS `author.name`, `books`.`id` AS `id` FROM `books` LEFT OUTER JOIN `authors` ON (`authors`.`id` = `books`.`author_id`) WHERE ((`authors`.`name` = ?) AND (`books`.`pages` >= ?)) ORDER BY `books`.`title` DESC LIMIT 20 OFFSET 5"
        );
    }

    #[test]
    fn empty_clauses_are_not_rendered() {
        let sql = render(Flavor::Sqlite, |sql| helpers::star_select("books").to_sql(sql));
        assert_eq!(sql.sql, r#"SELECT "books".* FROM "books""#);
        assert!(sql.params.is_empty());
    }

    #[test]
    fn insert_returning_depends_on_flavor() {
        let insert = Insert {
            table: TableName("books".to_string()),
            columns: vec![
                ColumnName("title".to_string()),
                ColumnName("pages".to_string()),
            ],
            values: vec![
                helpers::parameter(Param::Text("Dune".to_string())),
                helpers::parameter(Param::Integer(412)),
            ],
            returning: Some(SelectList::SelectStar),
        };

        let sql = render(Flavor::Postgresql, |sql| insert.to_sql(sql));
        assert_eq!(
            sql.sql,
            r#"INSERT INTO "books" ("title", "pages") VALUES ($1, $2) RETURNING *"#
        );

        let sql = render(Flavor::Mysql, |sql| insert.to_sql(sql));
        assert_eq!(
            sql.sql,
            "INSERT INTO `books` (`title`, `pages`) VALUES (?, ?)"
        );
    }

    #[test]
    fn insert_without_columns() {
        let insert = Insert {
            table: TableName("books".to_string()),
            columns: vec![],
            values: vec![],
            returning: Some(SelectList::SelectStar),
        };
        let sql = render(Flavor::Sqlite, |sql| insert.to_sql(sql));
        assert_eq!(sql.sql, r#"INSERT INTO "books" DEFAULT VALUES RETURNING *"#);
    }

    #[test]
    fn update_and_delete() {
        let lookup = Where(helpers::binary_operation(
            helpers::table_column("books", "id"),
            BinaryOperator::Equals,
            helpers::parameter(Param::Integer(3)),
        ));
        let update = Update {
            table: TableName("books".to_string()),
            set: vec![(
                ColumnName("genre".to_string()),
                helpers::parameter(Param::Null),
            )],
            where_: lookup.clone(),
        };
        let sql = render(Flavor::Postgresql, |sql| update.to_sql(sql));
        assert_eq!(
            sql.sql,
            r#"UPDATE "books" SET "genre" = $1 WHERE ("books"."id" = $2)"#
        );
        assert_eq!(sql.params, vec![Param::Null, Param::Integer(3)]);

        let delete = Delete {
            from: TableName("books".to_string()),
            where_: lookup,
        };
        let sql = render(Flavor::Postgresql, |sql| delete.to_sql(sql));
        assert_eq!(sql.sql, r#"DELETE FROM "books" WHERE ("books"."id" = $1)"#);
    }
}
