pub mod records;
pub mod search;
pub mod statistics;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::auth::require_api_key;
use crate::middleware::response::ApiResponse;
use crate::resources;

/// Query parameters the resource routes understand. Record selection and the
/// search term both ride on the query string, never the path.
#[derive(Debug, Deserialize)]
pub struct ResourceQuery {
    pub id: Option<String>,
    pub q: Option<String>,
}

/// `/api/:resource`, any method - route one request to exactly one handler.
///
/// Unknown resource names fall through to the discovery payload, like the
/// original router's default arm, so probing clients get a map rather than
/// an error.
pub async fn dispatch(
    Path(resource): Path<String>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<ResourceQuery>,
    body: Bytes,
) -> Response {
    match resource.as_str() {
        "test" => {
            if method == Method::GET {
                ping().into_response()
            } else {
                ApiError::method_not_allowed().into_response()
            }
        }
        "statistics" => {
            if method == Method::GET {
                statistics::get().await.into_response()
            } else {
                ApiError::method_not_allowed().into_response()
            }
        }
        "search" => {
            if method == Method::GET {
                search::get(&query).await.into_response()
            } else {
                ApiError::method_not_allowed().into_response()
            }
        }
        name => match resources::lookup(name) {
            Some(schema) => {
                // Gated families check credentials before anything else, so
                // even an unsupported verb answers 401 without a key.
                if schema.requires_api_key {
                    if let Err(err) = require_api_key(&headers) {
                        return err.into_response();
                    }
                }
                records::handle(schema, method, &query, &body).await
            }
            None => index().await.into_response(),
        },
    }
}

/// Discovery payload: served from `/`, from unknown resource names, and from
/// every unmatched path. Always 200.
pub async fn index() -> ApiResponse<Value> {
    ApiResponse::success(
        format!("TPK Nilam Evaluasi WS API v{}", env!("CARGO_PKG_VERSION")),
        json!({
            "endpoints": {
                "GET /api/test": "Test API connection",
                "GET /api/evaluasi": "Get all evaluasi data",
                "GET /api/evaluasi?id={id}": "Get evaluasi by id",
                "POST /api/evaluasi": "Create new evaluasi",
                "PUT /api/evaluasi?id={id}": "Update evaluasi",
                "DELETE /api/evaluasi?id={id}": "Delete evaluasi",
                "GET /api/statistics": "Get evaluasi statistics",
                "GET /api/search?q={query}": "Search evaluasi data",
                "GET /api/target_data": "Get all target data (API key required)",
                "GET /api/target_data?id={id}": "Get target data by id (API key required)",
                "POST /api/target_data": "Create new target data (API key required)",
                "DELETE /api/target_data?id={id}": "Delete target data (API key required)",
                "GET /api/realisasi_data": "Get all realisasi data (API key required)",
                "GET /api/realisasi_data?id={id}": "Get realisasi data by id (API key required)",
                "POST /api/realisasi_data": "Create new realisasi data (API key required)",
                "DELETE /api/realisasi_data?id={id}": "Delete realisasi data (API key required)",
            }
        }),
    )
}

/// GET /api/test - liveness payload with version and server time. The time
/// is terminal wall-clock time, WIB (UTC+7, no DST).
fn ping() -> ApiResponse<Value> {
    let wib = FixedOffset::east_opt(7 * 3600).unwrap_or(Utc.fix());
    ApiResponse::success(
        "API is working!",
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().with_timezone(&wib).format("%Y-%m-%d %H:%M:%S").to_string(),
        }),
    )
}
