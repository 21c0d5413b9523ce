//! Profile and account management endpoints.
//!
//! `/api/users/me` serves the caller's own profile; the bare `/api/users`
//! listing is admin-only and supports role/search filters with pagination.

use axum::extract::{Query, State};
use axum::{response::IntoResponse, routing::get, Json, Router};
use serde::Deserialize;
use serde_json::json;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::{Role, User};
use crate::{AppError, Config};

use super::auth::{validate_name, validate_phone};
use super::pagination;

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new()
        .route("/api/users/me", get(me).put(update_profile))
        .route("/api/users", get(list_users))
}

async fn me(
    State((pool, _config)): State<(PgPool, Config)>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    // ---
    let user = fetch_user(&pool, auth.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
            "phone": user.phone,
            "location": user.location,
            "state": user.state,
            "district": user.district,
            "farmSize": user.farm_size,
            "createdAt": user.created_at,
        },
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest {
    name: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    state: Option<String>,
    district: Option<String>,
    farm_size: Option<f64>,
}

async fn update_profile(
    State((pool, _config)): State<(PgPool, Config)>,
    auth: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    // ---
    let name = body.name.map(|n| n.trim().to_string());
    if let Some(name) = &name {
        validate_name(name)?;
    }
    if let Some(phone) = &body.phone {
        validate_phone(phone)?;
    }
    if let Some(farm_size) = body.farm_size {
        if farm_size <= 0.0 {
            return Err(AppError::Validation(
                "Farm size must be greater than 0".into(),
            ));
        }
    }

    let row = sqlx::query(
        r#"
        UPDATE users SET
            name       = COALESCE($2, name),
            phone      = COALESCE($3, phone),
            location   = COALESCE($4, location),
            state      = COALESCE($5, state),
            district   = COALESCE($6, district),
            farm_size  = COALESCE($7, farm_size),
            updated_at = now()
        WHERE id = $1
        RETURNING id, name, email, phone, location, role, state, district,
                  farm_size, is_active, created_at
        "#,
    )
    .bind(auth.id)
    .bind(name.as_deref())
    .bind(body.phone.as_deref())
    .bind(body.location.as_deref())
    .bind(body.state.as_deref())
    .bind(body.district.as_deref())
    .bind(body.farm_size)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::UserNotFound)?;

    let user = user_from_row(&row)?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "data": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "phone": user.phone,
            "location": user.location,
            "state": user.state,
            "district": user.district,
            "farmSize": user.farm_size,
        },
    })))
}

#[derive(Debug, Deserialize)]
struct ListUsersQuery {
    role: Option<Role>,
    search: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_users(
    State((pool, _config)): State<(PgPool, Config)>,
    auth: AuthUser,
    Query(params): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, AppError> {
    // ---
    auth.require_role(Role::Admin)?;

    let page = i64::from(params.page.unwrap_or(1).max(1));
    let limit = i64::from(params.limit.unwrap_or(10).max(1));
    let offset = (page - 1) * limit;
    let role = params.role.map(|r| r.as_str());
    let pattern = params.search.as_ref().map(|s| format!("%{s}%"));

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM users
        WHERE is_active = TRUE
          AND ($1::text IS NULL OR role = $1)
          AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2 OR location ILIKE $2)
        "#,
    )
    .bind(role)
    .bind(pattern.as_deref())
    .fetch_one(&pool)
    .await?;

    let rows = sqlx::query(
        r#"
        SELECT id, name, email, phone, location, role, state, district,
               farm_size, is_active, created_at
        FROM users
        WHERE is_active = TRUE
          AND ($1::text IS NULL OR role = $1)
          AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2 OR location ILIKE $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(role)
    .bind(pattern.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(&pool)
    .await?;

    let users = rows
        .iter()
        .map(user_from_row)
        .collect::<Result<Vec<User>, AppError>>()?;

    Ok(Json(json!({
        "success": true,
        "data": users,
        "pagination": pagination(page, limit, total),
    })))
}

// ---

async fn fetch_user(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    // ---
    let row = sqlx::query(
        r#"
        SELECT id, name, email, phone, location, role, state, district,
               farm_size, is_active, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::UserNotFound)?;

    user_from_row(&row)
}

fn user_from_row(row: &PgRow) -> Result<User, AppError> {
    // ---
    Ok(User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        location: row.get("location"),
        role: row
            .get::<String, _>("role")
            .parse()
            .map_err(AppError::internal)?,
        state: row.get("state"),
        district: row.get("district"),
        farm_size: row.get("farm_size"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    })
}
