//! Type definitions of a low-level SQL string representation.

/// The SQL dialect a statement is rendered for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Flavor {
    #[default]
    Postgresql,
    Mysql,
    Sqlite,
}

impl Flavor {
    /// Pick the flavor from the scheme of a connection URI, such as
    /// `postgres://user@host/db` or `sqlite::memory:`.
    pub fn from_connection_uri(uri: &str) -> Option<Flavor> {
        let (scheme, _) = uri.split_once(':')?;
        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Flavor::Postgresql),
            "mysql" | "mariadb" => Some(Flavor::Mysql),
            "sqlite" => Some(Flavor::Sqlite),
            _ => None,
        }
    }

    /// MySQL has no `RETURNING` clause.
    pub fn supports_returning(self) -> bool {
        !matches!(self, Flavor::Mysql)
    }

    fn identifier_quote(self) -> char {
        match self {
            Flavor::Mysql => '`',
            Flavor::Postgresql | Flavor::Sqlite => '"',
        }
    }
}

/// A parameterized SQL statement.
#[derive(Debug, PartialEq)]
pub struct SQL {
    pub sql: String,
    pub params: Vec<Param>,
    /// for internal use and tests only
    pub param_index: u64,
    pub flavor: Flavor,
}

impl Default for SQL {
    fn default() -> Self {
        Self::new(Flavor::default())
    }
}

/// A parameter for a parameterized query.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl SQL {
    pub fn new(flavor: Flavor) -> SQL {
        SQL {
            sql: String::new(),
            params: vec![],
            param_index: 0,
            flavor,
        }
    }

    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append a quoted identifier. Quote characters inside the name are doubled.
    pub fn append_identifier(&mut self, identifier: &str) {
        let quote = self.flavor.identifier_quote();
        self.sql.push(quote);
        for c in identifier.chars() {
            if c == quote {
                self.sql.push(quote);
            }
            self.sql.push(c);
        }
        self.sql.push(quote);
    }

    /// Append a positional placeholder and record the parameter it stands for.
    pub fn append_param(&mut self, param: Param) {
        self.param_index += 1;
        match self.flavor {
            Flavor::Postgresql => {
                self.sql.push('$');
                self.sql.push_str(&self.param_index.to_string());
            }
            Flavor::Mysql | Flavor::Sqlite => self.sql.push('?'),
        }
        self.params.push(param);
    }
}
