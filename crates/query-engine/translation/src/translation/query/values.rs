//! Handle the translation of literal values.

use query_engine_metadata::metadata::FieldType;
use query_engine_sql::sql::string::Param;

/// Convert a raw query string value into a parameter of the declared field type.
/// Values that do not parse, and values of fields we know nothing about, are bound as text.
pub fn translate_raw_value(field_type: Option<FieldType>, raw: &str) -> Param {
    let text = || Param::Text(raw.to_string());
    match field_type {
        Some(FieldType::Integer) => raw.parse().map_or_else(|_| text(), Param::Integer),
        Some(FieldType::Float) => raw.parse().map_or_else(|_| text(), Param::Float),
        Some(FieldType::Boolean) => match raw {
            "1" => Param::Boolean(true),
            "0" => Param::Boolean(false),
            _ if raw.eq_ignore_ascii_case("true") => Param::Boolean(true),
            _ if raw.eq_ignore_ascii_case("false") => Param::Boolean(false),
            _ => text(),
        },
        Some(FieldType::Text | FieldType::Timestamp) | None => text(),
    }
}

/// Convert a JSON value from a request body into a parameter.
pub fn translate_json_value(field_type: Option<FieldType>, value: &serde_json::Value) -> Param {
    match value {
        serde_json::Value::Null => Param::Null,
        serde_json::Value::Bool(b) => Param::Boolean(*b),
        serde_json::Value::Number(number) => match (field_type, number.as_i64()) {
            (Some(FieldType::Float), _) | (_, None) => {
                number.as_f64().map_or_else(|| Param::Text(number.to_string()), Param::Float)
            }
            (_, Some(integer)) => Param::Integer(integer),
        },
        serde_json::Value::String(s) => translate_raw_value(field_type, s),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Param::Text(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_follow_the_declared_type() {
        assert_eq!(
            translate_raw_value(Some(FieldType::Integer), "353"),
            Param::Integer(353)
        );
        assert_eq!(
            translate_raw_value(Some(FieldType::Float), "4.5"),
            Param::Float(4.5)
        );
        assert_eq!(
            translate_raw_value(Some(FieldType::Boolean), "TRUE"),
            Param::Boolean(true)
        );
        assert_eq!(
            translate_raw_value(Some(FieldType::Boolean), "0"),
            Param::Boolean(false)
        );
        assert_eq!(
            translate_raw_value(Some(FieldType::Text), "353"),
            Param::Text("353".to_string())
        );
        assert_eq!(
            translate_raw_value(None, "Chuck Palahniuk"),
            Param::Text("Chuck Palahniuk".to_string())
        );
    }

    #[test]
    fn unparsable_values_fall_back_to_text() {
        assert_eq!(
            translate_raw_value(Some(FieldType::Integer), "1; DROP TABLE books"),
            Param::Text("1; DROP TABLE books".to_string())
        );
        assert_eq!(
            translate_raw_value(Some(FieldType::Boolean), "yes"),
            Param::Text("yes".to_string())
        );
    }

    #[test]
    fn json_values() {
        assert_eq!(
            translate_json_value(Some(FieldType::Integer), &serde_json::json!(279)),
            Param::Integer(279)
        );
        assert_eq!(
            translate_json_value(Some(FieldType::Float), &serde_json::json!(2)),
            Param::Float(2.0)
        );
        assert_eq!(
            translate_json_value(Some(FieldType::Integer), &serde_json::json!("12")),
            Param::Integer(12)
        );
        assert_eq!(
            translate_json_value(Some(FieldType::Text), &serde_json::json!(null)),
            Param::Null
        );
        assert_eq!(
            translate_json_value(Some(FieldType::Text), &serde_json::json!(["a"])),
            Param::Text(r#"["a"]"#.to_string())
        );
    }
}
