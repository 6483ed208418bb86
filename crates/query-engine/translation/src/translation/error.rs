//! Errors for query translation.

/// A single problem with the request. The `Display` output is the message sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    InvalidSelectorField(String),
    InvalidConditionField(String),
    InvalidOrderField(String),
    InvalidBodyField(String),
    NotANumber {
        parameter: WindowParameter,
        value: String,
    },
}

/// The query parameters bounding the result window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowParameter {
    Limit,
    Offset,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            QueryError::InvalidSelectorField(field) => {
                write!(f, "Invalid field on the fields selector: {field}")
            }
            QueryError::InvalidConditionField(field) => {
                write!(f, "Invalid field on the condition: {field}")
            }
            QueryError::InvalidOrderField(field) => {
                write!(f, "Invalid field on the order by: {field}")
            }
            QueryError::InvalidBodyField(field) => {
                write!(f, "Invalid field on the body: {field}")
            }
            QueryError::NotANumber { parameter, value } => {
                let parameter = match parameter {
                    WindowParameter::Limit => "Limit",
                    WindowParameter::Offset => "Offset",
                };
                write!(f, "{parameter} expects a number, received: {value}")
            }
        }
    }
}

/// An ordered batch of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryErrors(pub Vec<QueryError>);

impl QueryErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = QueryError>) {
        self.0.extend(errors);
    }

    /// The client facing messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl std::fmt::Display for QueryErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

/// A type for translation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The request references fields or values we cannot accept.
    Validation(QueryErrors),
    /// The path segment of an item endpoint does not fit the lookup field.
    InvalidLookup(String),
    Internal(String),
}

/// Display errors.
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Validation(errors) => write!(f, "{errors}"),
            Error::InvalidLookup(field) => write!(f, "invalid ID ({field})"),
            Error::Internal(message) => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for Error {}
