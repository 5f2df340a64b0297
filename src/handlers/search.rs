use serde_json::Value;
use sqlx::Row;

use super::ResourceQuery;
use crate::database::manager::Database;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::resources::EVALUASI;

const SEARCH_FAILED: &str = "Failed to search data";

/// GET /api/search?q={term} - case-insensitive substring match on vessel
/// name or date over the evaluasi rows, newest first. No ranking and no
/// pagination; the dataset is a few rows per shift.
pub async fn get(query: &ResourceQuery) -> ApiResult<Value> {
    // Presence is the only check: `?q=` carries an empty term, and its `%%`
    // pattern matches every row.
    let Some(term) = query.q.as_deref() else {
        return Err(ApiError::bad_request("Search query (q) is required"));
    };

    let pool = Database::pool()
        .await
        .map_err(|e| ApiError::store(SEARCH_FAILED, e))?;

    let sql = format!(
        "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" \
         WHERE \"kapal\" ILIKE $1 OR \"tanggal\" ILIKE $1 ORDER BY id DESC) t",
        EVALUASI.table
    );
    let pattern = format!("%{}%", term);

    let rows = sqlx::query(&sql)
        .bind(&pattern)
        .fetch_all(&pool)
        .await
        .map_err(|e| ApiError::store(SEARCH_FAILED, e))?;

    let records: Vec<Value> = rows
        .iter()
        .map(|row| row.try_get::<Value, _>("row").unwrap_or(Value::Null))
        .collect();

    Ok(ApiResponse::success(
        "Search completed successfully",
        Value::Array(records),
    ))
}
