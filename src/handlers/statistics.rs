use serde::Serialize;
use sqlx::Row;

use crate::database::manager::Database;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

const STATISTICS_FAILED: &str = "Failed to retrieve statistics";

/// Aggregates over the whole evaluasi table. Sums and quantity averages are
/// reported as whole numbers, percentage outputs to two decimals.
///
/// `persen_bongkar` and `persen_muat` are overall completion rates derived
/// from the summed totals, not averages of the per-row percentages.
#[derive(Debug, Serialize)]
pub struct Statistics {
    pub total_records: i64,
    pub total_bongkar: i64,
    pub total_muat: i64,
    pub total_target_bongkar: i64,
    pub total_target_muat: i64,
    pub avg_bongkar: i64,
    pub avg_muat: i64,
    pub avg_persen_bongkar: f64,
    pub avg_persen_muat: f64,
    pub persen_bongkar: f64,
    pub persen_muat: f64,
}

// Aggregates are cast in SQL so no arbitrary-precision numeric crosses the
// wire; on an empty table every aggregate but COUNT comes back NULL.
const STATISTICS_SQL: &str = "SELECT \
        COUNT(*) AS total_records, \
        SUM(realisasi_bongkar)::BIGINT AS total_bongkar, \
        SUM(realisasi_muat)::BIGINT AS total_muat, \
        SUM(target_bongkar)::BIGINT AS total_target_bongkar, \
        SUM(target_muat)::BIGINT AS total_target_muat, \
        AVG(realisasi_bongkar)::DOUBLE PRECISION AS avg_bongkar, \
        AVG(realisasi_muat)::DOUBLE PRECISION AS avg_muat, \
        AVG(persen_bongkar)::DOUBLE PRECISION AS avg_persen_bongkar, \
        AVG(persen_muat)::DOUBLE PRECISION AS avg_persen_muat \
    FROM evaluasi";

/// GET /api/statistics - one aggregation pass, derived rates computed after.
pub async fn get() -> ApiResult<Statistics> {
    let store = |e: sqlx::Error| ApiError::store(STATISTICS_FAILED, e);

    let pool = Database::pool()
        .await
        .map_err(|e| ApiError::store(STATISTICS_FAILED, e))?;

    let row = sqlx::query(STATISTICS_SQL)
        .fetch_one(&pool)
        .await
        .map_err(store)?;

    let total_records = row.try_get::<i64, _>("total_records").map_err(store)?;
    let total_bongkar = sum(&row, "total_bongkar").map_err(store)?;
    let total_muat = sum(&row, "total_muat").map_err(store)?;
    let total_target_bongkar = sum(&row, "total_target_bongkar").map_err(store)?;
    let total_target_muat = sum(&row, "total_target_muat").map_err(store)?;
    let avg_bongkar = average(&row, "avg_bongkar").map_err(store)?;
    let avg_muat = average(&row, "avg_muat").map_err(store)?;
    let avg_persen_bongkar = average(&row, "avg_persen_bongkar").map_err(store)?;
    let avg_persen_muat = average(&row, "avg_persen_muat").map_err(store)?;

    Ok(ApiResponse::success(
        "Statistics retrieved successfully",
        Statistics {
            total_records,
            total_bongkar,
            total_muat,
            total_target_bongkar,
            total_target_muat,
            avg_bongkar: avg_bongkar as i64,
            avg_muat: avg_muat as i64,
            avg_persen_bongkar: round2(avg_persen_bongkar),
            avg_persen_muat: round2(avg_persen_muat),
            persen_bongkar: overall_percentage(total_bongkar, total_target_bongkar),
            persen_muat: overall_percentage(total_muat, total_target_muat),
        },
    ))
}

fn sum(row: &sqlx::postgres::PgRow, column: &str) -> Result<i64, sqlx::Error> {
    Ok(row.try_get::<Option<i64>, _>(column)?.unwrap_or(0))
}

fn average(row: &sqlx::postgres::PgRow, column: &str) -> Result<f64, sqlx::Error> {
    Ok(row.try_get::<Option<f64>, _>(column)?.unwrap_or(0.0))
}

/// Overall completion rate: 100 * realized / target, and 0 when there is no
/// target to divide by.
fn overall_percentage(realized: i64, target: i64) -> f64 {
    if target > 0 {
        round2(realized as f64 / target as f64 * 100.0)
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
