use serde_json::{Map, Value};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

use crate::error::ApiError;

/// Column kinds the dataset needs. The kind drives both request-value
/// coercion and the bind-parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// One record family: wire name, backing table, business columns (which are
/// also the required set for writes), and the capabilities that differ
/// between families.
#[derive(Debug)]
pub struct TableSchema {
    pub resource: &'static str,
    pub table: &'static str,
    pub columns: &'static [Column],
    pub supports_update: bool,
    pub requires_api_key: bool,
    /// Reject undecodable or empty write bodies up front with "Invalid JSON
    /// input". The evaluasi family predates that guard and reports the first
    /// missing field instead.
    pub strict_body: bool,
}

impl TableSchema {
    /// Quoted column list in declaration order. Quoting keeps the camelCase
    /// column spellings the mobile client expects from the original database.
    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Full-table read, newest rows first, each row rendered to JSON by
    /// Postgres so the handler never names columns.
    pub fn select_all_sql(&self) -> String {
        format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" ORDER BY id DESC) t",
            self.table
        )
    }

    pub fn select_by_id_sql(&self) -> String {
        format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE id = $1) t",
            self.table
        )
    }

    pub fn insert_sql(&self) -> String {
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING id",
            self.table,
            self.column_list(),
            placeholders
        )
    }

    /// Full-row update; the id parameter comes after the column parameters.
    pub fn update_sql(&self) -> String {
        let assignments = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("\"{}\" = ${}", c.name, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE \"{}\" SET {} WHERE id = ${}",
            self.table,
            assignments,
            self.columns.len() + 1
        )
    }

    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM \"{}\" WHERE id = $1", self.table)
    }

    /// Decode a write body the way this family's original endpoint did.
    ///
    /// Strict families treat anything that does not decode to a non-empty
    /// JSON object as invalid input. The evaluasi family swallows decode
    /// failures and lets required-field validation report the first gap.
    pub fn parse_body(&self, body: &[u8]) -> Result<Map<String, Value>, ApiError> {
        match serde_json::from_slice::<Map<String, Value>>(body) {
            Ok(map) if !map.is_empty() => Ok(map),
            _ if self.strict_body => Err(ApiError::bad_request("Invalid JSON input")),
            _ => Ok(Map::new()),
        }
    }

    /// Presence-check and coerce the request fields into bind parameters in
    /// column order. Fails on the first violation, so error messages always
    /// name the earliest offending field.
    pub fn collect_params(&self, input: &Map<String, Value>) -> Result<Vec<BindValue>, ApiError> {
        let mut params = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let value = match input.get(column.name) {
                None | Some(Value::Null) => {
                    return Err(ApiError::bad_request(format!(
                        "Field '{}' is required",
                        column.name
                    )));
                }
                Some(value) => value,
            };
            params.push(coerce(column, value)?);
        }
        Ok(params)
    }
}

/// A request value coerced and ready to bind to a parameterized statement.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Int(i64),
    Real(f64),
    Text(String),
}

fn coerce(column: &Column, value: &Value) -> Result<BindValue, ApiError> {
    match column.kind {
        ColumnKind::Integer => integer_value(value).map(BindValue::Int).ok_or_else(|| {
            ApiError::bad_request(format!("Field '{}' must be an integer", column.name))
        }),
        ColumnKind::Real => real_value(value).map(BindValue::Real).ok_or_else(|| {
            ApiError::bad_request(format!("Field '{}' must be a number", column.name))
        }),
        ColumnKind::Text => text_value(value).map(BindValue::Text).ok_or_else(|| {
            ApiError::bad_request(format!("Field '{}' must be a string", column.name))
        }),
    }
}

/// Driver-style leniency: numeric strings bind as numbers and fractional
/// values truncate toward zero, so clients that stringify form inputs keep
/// working.
fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

fn real_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Bind collected parameters onto a query in order.
pub fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [BindValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            BindValue::Int(i) => query.bind(*i),
            BindValue::Real(f) => query.bind(*f),
            BindValue::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}
