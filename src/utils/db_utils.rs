use crate::error::ApiError;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlConnection;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Every column must appear in `allowed`; column names never come from the
/// payload unchecked.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, ApiError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::InvalidInput("Payload must be a JSON object".into()))?;

    if obj.is_empty() {
        return Err(ApiError::InvalidInput("No fields provided for update".into()));
    }

    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ApiError::InvalidInput(format!(
                "Field '{}' is not editable on {}",
                key, table
            )));
        }
    }

    // Build SET clause
    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => {
                return Err(ApiError::InvalidInput(
                    "Unsupported JSON value type".into(),
                ));
            }
        }
    }

    // WHERE id = ?
    values.push(SqlValue::I64(id_value as i64));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
/// Takes a bare connection so callers can run it inside a transaction.
pub async fn execute_update(
    conn: &mut MySqlConnection,
    update: SqlUpdate,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(conn).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_set_clause_from_payload_keys() {
        let update = build_update_sql(
            "employees",
            &json!({"name": "X", "rate_per_month": 3500.0}),
            &["name", "rate_per_month"],
            "id",
            3,
        )
        .unwrap();
        assert!(update.sql.starts_with("UPDATE employees SET "));
        assert!(update.sql.contains("name = ?"));
        assert!(update.sql.contains("rate_per_month = ?"));
        assert!(update.sql.ends_with("WHERE id = ?"));
        // payload values plus the id bind
        assert_eq!(update.values.len(), 3);
    }

    #[test]
    fn rejects_columns_outside_whitelist() {
        let err = build_update_sql(
            "employees",
            &json!({"password": "oops"}),
            &["name"],
            "id",
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn rejects_empty_and_non_object_payloads() {
        assert!(build_update_sql("clients", &json!({}), &["name"], "id", 1).is_err());
        assert!(build_update_sql("clients", &json!([1, 2]), &["name"], "id", 1).is_err());
        assert!(build_update_sql("clients", &json!("name"), &["name"], "id", 1).is_err());
    }

    #[test]
    fn date_strings_bind_as_dates() {
        let update = build_update_sql(
            "attendance",
            &json!({"date": "2026-03-01"}),
            &["date"],
            "id",
            9,
        )
        .unwrap();
        assert!(matches!(update.values[0], SqlValue::Date(_)));
    }
}
