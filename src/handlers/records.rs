use axum::{
    body::Bytes,
    http::Method,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use sqlx::Row;

use super::ResourceQuery;
use crate::database::manager::Database;
use crate::database::table::{bind_params, TableSchema};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

const RETRIEVE_FAILED: &str = "Failed to retrieve data";
const CREATE_FAILED: &str = "Failed to create data";
const UPDATE_FAILED: &str = "Failed to update data";
const DELETE_FAILED: &str = "Failed to delete data";

/// Method switch for one record family: GET lists or shows, POST creates,
/// PUT replaces (families that support it), DELETE removes, anything else
/// is 405.
pub async fn handle(
    schema: &'static TableSchema,
    method: Method,
    query: &ResourceQuery,
    body: &Bytes,
) -> Response {
    route(schema, method, query, body).await.into_response()
}

async fn route(
    schema: &'static TableSchema,
    method: Method,
    query: &ResourceQuery,
    body: &Bytes,
) -> ApiResult<Value> {
    if method == Method::GET {
        match record_id(query)? {
            Some(id) => show(schema, id).await,
            None => list(schema).await,
        }
    } else if method == Method::POST {
        create(schema, body).await
    } else if method == Method::PUT && schema.supports_update {
        match record_id(query)? {
            Some(id) => update(schema, id, body).await,
            None => Err(ApiError::bad_request("ID is required for update")),
        }
    } else if method == Method::DELETE {
        match record_id(query)? {
            Some(id) => delete(schema, id).await,
            None => Err(ApiError::bad_request("ID is required for delete")),
        }
    } else {
        Err(ApiError::method_not_allowed())
    }
}

/// The `id` query parameter as an integer key. Only an absent parameter
/// selects the list form (or the "ID is required" arm on writes); any
/// present value must parse, so junk and empty strings are a validation
/// error rather than a silent zero.
fn record_id(query: &ResourceQuery) -> Result<Option<i64>, ApiError> {
    match query.id.as_deref() {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::bad_request("ID must be a number")),
    }
}

async fn list(schema: &'static TableSchema) -> ApiResult<Value> {
    let pool = Database::pool()
        .await
        .map_err(|e| ApiError::store(RETRIEVE_FAILED, e))?;

    let sql = schema.select_all_sql();
    let rows = sqlx::query(&sql)
        .fetch_all(&pool)
        .await
        .map_err(|e| ApiError::store(RETRIEVE_FAILED, e))?;

    let records: Vec<Value> = rows
        .iter()
        .map(|row| row.try_get::<Value, _>("row").unwrap_or(Value::Null))
        .collect();

    Ok(ApiResponse::success(
        "Data retrieved successfully",
        Value::Array(records),
    ))
}

async fn show(schema: &'static TableSchema, id: i64) -> ApiResult<Value> {
    let pool = Database::pool()
        .await
        .map_err(|e| ApiError::store(RETRIEVE_FAILED, e))?;

    let sql = schema.select_by_id_sql();
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(|e| ApiError::store(RETRIEVE_FAILED, e))?;

    match row {
        Some(row) => {
            let record = row.try_get::<Value, _>("row").unwrap_or(Value::Null);
            Ok(ApiResponse::success("Data retrieved successfully", record))
        }
        None => Err(ApiError::not_found("Data not found")),
    }
}

async fn create(schema: &'static TableSchema, body: &Bytes) -> ApiResult<Value> {
    // Validate before touching the pool, so bad requests never cost a
    // connection and answer the same with or without a reachable database.
    let input = schema.parse_body(body)?;
    let params = schema.collect_params(&input)?;

    let pool = Database::pool()
        .await
        .map_err(|e| ApiError::store(CREATE_FAILED, e))?;

    let sql = schema.insert_sql();
    let row = bind_params(sqlx::query(&sql), &params)
        .fetch_one(&pool)
        .await
        .map_err(|e| ApiError::store(CREATE_FAILED, e))?;

    let id = row
        .try_get::<i64, _>("id")
        .map_err(|e| ApiError::store(CREATE_FAILED, e))?;

    Ok(ApiResponse::success(
        "Data created successfully",
        json!({ "id": id }),
    ))
}

async fn update(schema: &'static TableSchema, id: i64, body: &Bytes) -> ApiResult<Value> {
    let input = schema.parse_body(body)?;
    let params = schema.collect_params(&input)?;

    let pool = Database::pool()
        .await
        .map_err(|e| ApiError::store(UPDATE_FAILED, e))?;

    let sql = schema.update_sql();
    let result = bind_params(sqlx::query(&sql), &params)
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| ApiError::store(UPDATE_FAILED, e))?;

    // rows_affected counts matched rows here, so rewriting a row with its
    // current values still acknowledges instead of claiming the row is gone.
    if result.rows_affected() > 0 {
        Ok(ApiResponse::message_only("Data updated successfully"))
    } else {
        Err(ApiError::not_found("Data not found or no changes made"))
    }
}

async fn delete(schema: &'static TableSchema, id: i64) -> ApiResult<Value> {
    let pool = Database::pool()
        .await
        .map_err(|e| ApiError::store(DELETE_FAILED, e))?;

    let sql = schema.delete_sql();
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| ApiError::store(DELETE_FAILED, e))?;

    if result.rows_affected() > 0 {
        Ok(ApiResponse::message_only("Data deleted successfully"))
    } else {
        Err(ApiError::not_found("Data not found"))
    }
}
