//! Water usage logging, listings, and analytics endpoints.
//!
//! Farmers log and list their own records and request their usage report;
//! admins list across farmers and request the system-wide report. Handlers
//! fetch the record slice the caller is entitled to and hand it to the pure
//! `analytics` module; no aggregation happens in SQL.

use axum::extract::{Query, State};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::analytics::{self, UsageReport};
use crate::auth::AuthUser;
use crate::models::{CropType, Period, Role, WaterSource, WaterUsage, WeatherCondition};
use crate::{AppError, Config};

use super::pagination;

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new()
        .route("/api/water-usage", post(add_usage).get(list_all_usage))
        .route("/api/water-usage/my", get(list_my_usage))
        .route("/api/water-usage/analytics/my", get(my_analytics))
        .route("/api/water-usage/analytics/system", get(system_analytics))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddUsageRequest {
    source: WaterSource,
    usage_amount: f64,
    date: DateTime<Utc>,
    crop_type: CropType,
    area_irrigated: f64,
    notes: Option<String>,
    weather_condition: Option<WeatherCondition>,
}

async fn add_usage(
    State((pool, _config)): State<(PgPool, Config)>,
    auth: AuthUser,
    Json(body): Json<AddUsageRequest>,
) -> Result<impl IntoResponse, AppError> {
    // ---
    auth.require_role(Role::Farmer)?;

    if body.usage_amount < 1.0 {
        return Err(AppError::Validation(
            "Usage amount must be at least 1 liter".into(),
        ));
    }
    if body.area_irrigated < 0.1 {
        return Err(AppError::Validation("Area must be greater than 0".into()));
    }

    let record = WaterUsage {
        id: Uuid::new_v4(),
        farmer_id: auth.id,
        source: body.source,
        usage_amount: body.usage_amount,
        date: body.date,
        crop_type: body.crop_type,
        area_irrigated: body.area_irrigated,
        notes: body.notes,
        weather_condition: body.weather_condition,
        efficiency: WaterUsage::efficiency_for(body.usage_amount, body.area_irrigated),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO water_usage
            (id, farmer_id, source, usage_amount, date, crop_type,
             area_irrigated, notes, weather_condition, efficiency, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(record.id)
    .bind(record.farmer_id)
    .bind(record.source.as_str())
    .bind(record.usage_amount)
    .bind(record.date)
    .bind(record.crop_type.as_str())
    .bind(record.area_irrigated)
    .bind(record.notes.as_deref())
    .bind(record.weather_condition.map(|w| w.as_str()))
    .bind(record.efficiency)
    .bind(record.created_at)
    .execute(&pool)
    .await?;

    info!(
        "usage logged: {} ({}L, {})",
        record.id,
        record.usage_amount,
        record.source.as_str()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Water usage logged successfully",
            "data": record,
        })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageListQuery {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_my_usage(
    State((pool, _config)): State<(PgPool, Config)>,
    auth: AuthUser,
    Query(params): Query<UsageListQuery>,
) -> Result<impl IntoResponse, AppError> {
    // ---
    auth.require_role(Role::Farmer)?;

    let page = i64::from(params.page.unwrap_or(1).max(1));
    let limit = i64::from(params.limit.unwrap_or(20).max(1));
    let offset = (page - 1) * limit;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM water_usage
        WHERE farmer_id = $1
          AND ($2::timestamptz IS NULL OR date >= $2)
          AND ($3::timestamptz IS NULL OR date <= $3)
        "#,
    )
    .bind(auth.id)
    .bind(params.start_date)
    .bind(params.end_date)
    .fetch_one(&pool)
    .await?;

    let rows = sqlx::query(
        r#"
        SELECT id, farmer_id, source, usage_amount, date, crop_type,
               area_irrigated, notes, weather_condition, efficiency, created_at
        FROM water_usage
        WHERE farmer_id = $1
          AND ($2::timestamptz IS NULL OR date >= $2)
          AND ($3::timestamptz IS NULL OR date <= $3)
        ORDER BY date DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(auth.id)
    .bind(params.start_date)
    .bind(params.end_date)
    .bind(limit)
    .bind(offset)
    .fetch_all(&pool)
    .await?;

    let records = rows
        .iter()
        .map(usage_from_row)
        .collect::<Result<Vec<WaterUsage>, AppError>>()?;

    Ok(Json(json!({
        "success": true,
        "data": records,
        "pagination": pagination(page, limit, total),
    })))
}

#[derive(Debug, Deserialize)]
struct AnalyticsQuery {
    period: Option<Period>,
}

/// Farmer report plus the breakdowns the dashboard renders beside it.
/// The breakdowns are folded over the same period-filtered slice the
/// report receives.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsPayload {
    #[serde(flatten)]
    report: UsageReport,
    source_breakdown: IndexMap<&'static str, f64>,
    crop_breakdown: IndexMap<&'static str, f64>,
    period: Period,
}

async fn my_analytics(
    State((pool, _config)): State<(PgPool, Config)>,
    auth: AuthUser,
    Query(params): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, AppError> {
    // ---
    auth.require_role(Role::Farmer)?;

    let period = params.period.unwrap_or(Period::All);
    let now = Utc::now();
    let cutoff = analytics::period_cutoff(period, now);

    let rows = sqlx::query(
        r#"
        SELECT id, farmer_id, source, usage_amount, date, crop_type,
               area_irrigated, notes, weather_condition, efficiency, created_at
        FROM water_usage
        WHERE farmer_id = $1
          AND ($2::timestamptz IS NULL OR date >= $2)
        ORDER BY created_at ASC
        "#,
    )
    .bind(auth.id)
    .bind(cutoff)
    .fetch_all(&pool)
    .await?;

    let records = rows
        .iter()
        .map(usage_from_row)
        .collect::<Result<Vec<WaterUsage>, AppError>>()?;

    let payload = AnalyticsPayload {
        report: analytics::usage_report(&records, now),
        source_breakdown: analytics::source_breakdown(&records),
        crop_breakdown: analytics::crop_breakdown(&records),
        period,
    };

    Ok(Json(json!({
        "success": true,
        "data": payload,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminUsageQuery {
    farmer_id: Option<Uuid>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Serialize)]
struct FarmerSummary {
    name: String,
    email: String,
    location: String,
}

/// Usage record enriched with its owner for the admin listing.
#[derive(Serialize)]
struct AdminUsageRow {
    #[serde(flatten)]
    record: WaterUsage,
    farmer: FarmerSummary,
}

async fn list_all_usage(
    State((pool, _config)): State<(PgPool, Config)>,
    auth: AuthUser,
    Query(params): Query<AdminUsageQuery>,
) -> Result<impl IntoResponse, AppError> {
    // ---
    auth.require_role(Role::Admin)?;

    let page = i64::from(params.page.unwrap_or(1).max(1));
    let limit = i64::from(params.limit.unwrap_or(20).max(1));
    let offset = (page - 1) * limit;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM water_usage
        WHERE ($1::uuid IS NULL OR farmer_id = $1)
          AND ($2::timestamptz IS NULL OR date >= $2)
          AND ($3::timestamptz IS NULL OR date <= $3)
        "#,
    )
    .bind(params.farmer_id)
    .bind(params.start_date)
    .bind(params.end_date)
    .fetch_one(&pool)
    .await?;

    let rows = sqlx::query(
        r#"
        SELECT w.id, w.farmer_id, w.source, w.usage_amount, w.date, w.crop_type,
               w.area_irrigated, w.notes, w.weather_condition, w.efficiency, w.created_at,
               u.name AS farmer_name, u.email AS farmer_email, u.location AS farmer_location
        FROM water_usage w
        JOIN users u ON u.id = w.farmer_id
        WHERE ($1::uuid IS NULL OR w.farmer_id = $1)
          AND ($2::timestamptz IS NULL OR w.date >= $2)
          AND ($3::timestamptz IS NULL OR w.date <= $3)
        ORDER BY w.date DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(params.farmer_id)
    .bind(params.start_date)
    .bind(params.end_date)
    .bind(limit)
    .bind(offset)
    .fetch_all(&pool)
    .await?;

    let records = rows
        .iter()
        .map(|row| {
            Ok(AdminUsageRow {
                record: usage_from_row(row)?,
                farmer: FarmerSummary {
                    name: row.get("farmer_name"),
                    email: row.get("farmer_email"),
                    location: row.get("farmer_location"),
                },
            })
        })
        .collect::<Result<Vec<AdminUsageRow>, AppError>>()?;

    Ok(Json(json!({
        "success": true,
        "data": records,
        "pagination": pagination(page, limit, total),
    })))
}

async fn system_analytics(
    State((pool, _config)): State<(PgPool, Config)>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    // ---
    auth.require_role(Role::Admin)?;

    let rows = sqlx::query(
        r#"
        SELECT id, farmer_id, source, usage_amount, date, crop_type,
               area_irrigated, notes, weather_condition, efficiency, created_at
        FROM water_usage
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let records = rows
        .iter()
        .map(usage_from_row)
        .collect::<Result<Vec<WaterUsage>, AppError>>()?;

    let report = analytics::system_report(&records);

    Ok(Json(json!({
        "success": true,
        "data": report,
    })))
}

// ---

fn usage_from_row(row: &PgRow) -> Result<WaterUsage, AppError> {
    // ---
    let weather: Option<String> = row.get("weather_condition");

    Ok(WaterUsage {
        id: row.get("id"),
        farmer_id: row.get("farmer_id"),
        source: row
            .get::<String, _>("source")
            .parse()
            .map_err(AppError::internal)?,
        usage_amount: row.get("usage_amount"),
        date: row.get("date"),
        crop_type: row
            .get::<String, _>("crop_type")
            .parse()
            .map_err(AppError::internal)?,
        area_irrigated: row.get("area_irrigated"),
        notes: row.get("notes"),
        weather_condition: weather
            .as_deref()
            .map(|w| w.parse())
            .transpose()
            .map_err(AppError::internal)?,
        efficiency: row.get("efficiency"),
        created_at: row.get("created_at"),
    })
}
