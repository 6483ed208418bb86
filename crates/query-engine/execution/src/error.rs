//! Errors for query execution.

use std::fmt;

/// Errors raised while running a statement.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The database refused the statement because it breaks a constraint of the table. The
    /// message is meant for the client.
    #[error("{0}")]
    Constraint(String),
    #[error("{0}")]
    DB(sqlx::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Error {
        match &err {
            sqlx::Error::Database(db_error) => match db_error.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => {
                    Error::Constraint(constraint_message(db_error.code(), db_error.message()))
                }
                _ => Error::DB(err),
            },
            _ => Error::DB(err),
        }
    }
}

/// `Error <code>: <message>`, or the bare message when the driver reports no code.
fn constraint_message(code: Option<impl fmt::Display>, message: &str) -> String {
    match code {
        Some(code) => format!("Error {code}: {message}"),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::constraint_message;

    #[test]
    fn constraint_messages_carry_the_code() {
        assert_eq!(
            constraint_message(Some("2067"), "UNIQUE constraint failed: authors.name"),
            "Error 2067: UNIQUE constraint failed: authors.name"
        );
        assert_eq!(
            constraint_message(None::<&str>, "NOT NULL constraint failed"),
            "NOT NULL constraint failed"
        );
    }
}
