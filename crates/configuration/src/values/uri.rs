use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Secret;

/// The URI of the database, such as `postgres://user@host/db` or `sqlite:books.db`.
/// The scheme selects the SQL flavor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ConnectionUri(pub Secret);

impl From<String> for ConnectionUri {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<&str> for ConnectionUri {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}
