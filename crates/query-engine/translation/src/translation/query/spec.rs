//! The query parameters of a single list request.

use indexmap::IndexMap;

/// Keys that configure the query instead of filtering it.
pub const RESERVED_KEYS: [&str; 4] = ["fields", "order", "limit", "offset"];

/// The raw query keys of one request mapped to their values,
/// in the order the keys first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    params: IndexMap<String, Vec<String>>,
}

impl QuerySpec {
    /// Parse an `application/x-www-form-urlencoded` query string.
    pub fn parse(raw: &str) -> QuerySpec {
        QuerySpec::from_pairs(url::form_urlencoded::parse(raw.as_bytes()))
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> QuerySpec
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut params: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, value) in pairs {
            params.entry(key.into()).or_default().push(value.into());
        }
        QuerySpec { params }
    }

    /// The first value given for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// The filtering keys with their first value, reserved keys excluded.
    pub fn conditions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().filter_map(|(key, values)| {
            if RESERVED_KEYS.contains(&key.as_str()) {
                return None;
            }
            values
                .first()
                .map(|value| (key.as_str(), value.as_str()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
