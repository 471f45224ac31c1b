//! JSON ⇄ SQLite value conversion and parameter binding

use std::collections::HashSet;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::Statement;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::domain::QueryParameters;
use crate::{RepositoryError, Result};

const PLACEHOLDER_PREFIXES: [char; 3] = [':', '@', '$'];

/// One result row as (column name, value) pairs in select order
pub(crate) type Record = Vec<(String, Value)>;

pub(crate) fn to_sql_value(value: &Value) -> Result<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => SqlValue::Integer(i),
            // Integers above i64::MAX must not degrade to REAL
            (None, _) if n.is_u64() => {
                return Err(RepositoryError::parameter(format!(
                    "integer {} out of SQLite range",
                    n
                )))
            }
            (None, Some(f)) => SqlValue::Real(f),
            (None, None) => {
                return Err(RepositoryError::parameter(format!(
                    "number {} cannot be represented in SQLite",
                    n
                )))
            }
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(serde_json::to_string(value)?),
    })
}

pub(crate) fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

/// Reject result sets where two columns share a name
///
/// Rows decode into objects keyed by column name, so a repeated name would
/// silently drop a value.
pub(crate) fn ensure_distinct_columns(query_name: &str, columns: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(RepositoryError::serialization(format!(
                "query '{}' selects column '{}' more than once; give each column a distinct alias",
                query_name, column
            )));
        }
    }
    Ok(())
}

/// Bind the active parameter set onto a freshly prepared statement
pub(crate) fn bind_parameters(stmt: &mut Statement<'_>, parameters: &QueryParameters) -> Result<()> {
    let expected = stmt.parameter_count();
    if parameters.len() != expected {
        return Err(RepositoryError::parameter(format!(
            "statement expects {} parameters, {} {} given",
            expected,
            parameters.len(),
            parameters.kind()
        )));
    }

    match parameters {
        QueryParameters::Keyed(map) => {
            for (key, value) in map.iter() {
                let index = placeholder_index(stmt, key)?.ok_or_else(|| {
                    RepositoryError::parameter(format!("no placeholder for parameter '{}'", key))
                })?;
                stmt.raw_bind_parameter(index, to_sql_value(value)?)?;
            }
        }
        QueryParameters::Positional(array) => {
            for (i, value) in array.iter().enumerate() {
                stmt.raw_bind_parameter(i + 1, to_sql_value(value)?)?;
            }
        }
    }
    Ok(())
}

/// Match `key` against `:key`, `@key` or `$key` (or `key` itself if prefixed)
fn placeholder_index(stmt: &Statement<'_>, key: &str) -> Result<Option<usize>> {
    if key.starts_with(&PLACEHOLDER_PREFIXES[..]) {
        return Ok(stmt.parameter_index(key)?);
    }
    for prefix in PLACEHOLDER_PREFIXES {
        if let Some(index) = stmt.parameter_index(&format!("{}{}", prefix, key))? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// Map a record into `T`
///
/// Rows decode as JSON objects keyed by column name. A single-column row
/// whose object form does not fit `T` decodes from the bare column value, so
/// `list::<i64>()` works for `SELECT COUNT(*) ...`.
pub(crate) fn decode_record<T: DeserializeOwned>(record: Record) -> Result<T> {
    let scalar = match record.as_slice() {
        [(_, value)] => Some(value.clone()),
        _ => None,
    };
    let object: Map<String, Value> = record.into_iter().collect();

    match serde_json::from_value(Value::Object(object)) {
        Ok(entity) => Ok(entity),
        Err(err) => match scalar {
            Some(value) => serde_json::from_value(value).map_err(|_| err.into()),
            None => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde::Deserialize;
    use serde_json::json;

    // ═══════════════════════════════════════════════════════════════════════
    // Value Conversion Tests
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_to_sql_value() {
        assert_eq!(to_sql_value(&json!(null)).unwrap(), SqlValue::Null);
        assert_eq!(to_sql_value(&json!(true)).unwrap(), SqlValue::Integer(1));
        assert_eq!(to_sql_value(&json!(-42)).unwrap(), SqlValue::Integer(-42));
        assert_eq!(to_sql_value(&json!(1.5)).unwrap(), SqlValue::Real(1.5));
        assert_eq!(
            to_sql_value(&json!("abc")).unwrap(),
            SqlValue::Text("abc".to_string())
        );
        assert_eq!(
            to_sql_value(&json!([1, 2])).unwrap(),
            SqlValue::Text("[1,2]".to_string())
        );
    }

    #[test]
    fn test_to_sql_value_large_unsigned() {
        let err = to_sql_value(&json!(u64::MAX - 1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parameter);
        assert!(err.message.contains("out of SQLite range"));

        // i64::MAX itself still fits
        assert_eq!(
            to_sql_value(&json!(i64::MAX as u64)).unwrap(),
            SqlValue::Integer(i64::MAX)
        );
    }

    #[test]
    fn test_from_sql_value() {
        assert_eq!(from_sql_value(ValueRef::Null), json!(null));
        assert_eq!(from_sql_value(ValueRef::Integer(7)), json!(7));
        assert_eq!(from_sql_value(ValueRef::Real(0.25)), json!(0.25));
        assert_eq!(from_sql_value(ValueRef::Text(b"hi")), json!("hi"));
        assert_eq!(from_sql_value(ValueRef::Blob(&[1, 255])), json!([1, 255]));
        assert_eq!(from_sql_value(ValueRef::Real(f64::NAN)), json!(null));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Row Decoding Tests
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_ensure_distinct_columns() {
        let distinct = vec!["id".to_string(), "name".to_string()];
        assert!(ensure_distinct_columns("q", &distinct).is_ok());

        let repeated = vec!["id".to_string(), "name".to_string(), "id".to_string()];
        let err = ensure_distinct_columns("Order.withCustomer", &repeated).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
        assert!(err.message.contains("Order.withCustomer"));
        assert!(err.message.contains("'id'"));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    #[test]
    fn test_decode_record_object() {
        let record = vec![
            ("id".to_string(), json!(1)),
            ("name".to_string(), json!("alice")),
        ];
        let user: User = decode_record(record).unwrap();
        assert_eq!(
            user,
            User {
                id: 1,
                name: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_decode_record_scalar() {
        let record = vec![("COUNT(*)".to_string(), json!(3))];
        let count: i64 = decode_record(record).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_decode_record_mismatch() {
        let record = vec![("id".to_string(), json!("not a number"))];
        let err = decode_record::<User>(record).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }
}
