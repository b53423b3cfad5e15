//! Unrestricted SQL execution backing `/tools/sql`.
//!
//! The statement text is handed to SQLite verbatim (no parameters, no
//! allow-list). Each returned row becomes a JSON object keyed by the column
//! names the driver reports for that row.

use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::debug;

use crate::db::sqlite::Storage;

pub type JsonRow = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum RawQueryError {
    #[error("Error executing SQL query: {0}")]
    Execute(#[source] sqlx::Error),

    #[error("Error decoding column `{column}`: {source}")]
    Decode {
        column: String,
        #[source]
        source: sqlx::Error,
    },
}

enum ValueClass {
    Null,
    Integer,
    Real,
    Blob,
    Text,
}

impl Storage {
    pub async fn run_raw(&self, sql: &str) -> Result<Vec<JsonRow>, RawQueryError> {
        debug!(sql, "executing raw sql");
        let rows = sqlx::raw_sql(sql)
            .fetch_all(self.pool())
            .await
            .map_err(RawQueryError::Execute)?;
        rows.iter().map(row_to_json).collect()
    }
}

fn row_to_json(row: &SqliteRow) -> Result<JsonRow, RawQueryError> {
    let mut out = Map::with_capacity(row.len());
    for column in row.columns() {
        let name = column.name().to_string();
        let value = column_value(row, column.ordinal()).map_err(|source| RawQueryError::Decode {
            column: name.clone(),
            source,
        })?;
        out.insert(name, value);
    }
    Ok(out)
}

fn column_value(row: &SqliteRow, idx: usize) -> Result<Value, sqlx::Error> {
    let class = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            ValueClass::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => ValueClass::Integer,
                "REAL" | "NUMERIC" => ValueClass::Real,
                "BLOB" => ValueClass::Blob,
                _ => ValueClass::Text,
            }
        }
    };

    let value = match class {
        ValueClass::Null => Value::Null,
        ValueClass::Integer => Value::from(row.try_get_unchecked::<i64, _>(idx)?),
        ValueClass::Real => Number::from_f64(row.try_get_unchecked::<f64, _>(idx)?)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueClass::Blob => Value::from(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
        ValueClass::Text => Value::from(row.try_get_unchecked::<String, _>(idx)?),
    };
    Ok(value)
}
