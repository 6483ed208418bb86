//! The window of rows a list query returns.

use query_engine_sql::sql;

use super::spec::QuerySpec;
use crate::translation::error::{QueryError, WindowParameter};

/// The limit applied when only an offset is given.
pub const DEFAULT_LIMIT: u64 = 20;

/// Parse `limit` and `offset`. Without a limit the window is unbounded, unless an offset is
/// given, which forces a limit of [`DEFAULT_LIMIT`]. Empty values count as absent.
///
/// Databases take a signed 64-bit window, so larger values are rejected like any other
/// non-number.
pub fn translate_window(query: &QuerySpec) -> Result<sql::ast::Limit, Vec<QueryError>> {
    let mut errors = vec![];
    let limit = parse(query, "limit", WindowParameter::Limit, &mut errors);
    let offset = parse(query, "offset", WindowParameter::Offset, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    let limit = match (limit, offset) {
        (None, Some(_)) => Some(DEFAULT_LIMIT),
        (limit, _) => limit,
    };
    Ok(sql::ast::Limit { limit, offset })
}

fn parse(
    query: &QuerySpec,
    key: &str,
    parameter: WindowParameter,
    errors: &mut Vec<QueryError>,
) -> Option<u64> {
    let value = query.get(key).filter(|value| !value.is_empty())?;
    match value
        .parse::<i64>()
        .ok()
        .and_then(|number| u64::try_from(number).ok())
    {
        Some(number) => Some(number),
        None => {
            errors.push(QueryError::NotANumber {
                parameter,
                value: value.to_string(),
            });
            None
        }
    }
}
