//! Account registration and login endpoints.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, issue_token, verify_password};
use crate::models::Role;
use crate::{AppError, Config};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
    phone: String,
    location: String,
    role: Option<Role>,
}

async fn signup(
    State((pool, config)): State<(PgPool, Config)>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    // ---
    let name = body.name.trim().to_string();
    let email = body.email.trim().to_lowercase();
    let location = body.location.trim().to_string();

    validate_name(&name)?;
    validate_email(&email)?;
    validate_password(&body.password)?;
    validate_phone(&body.phone)?;
    if location.is_empty() {
        return Err(AppError::Validation("Please provide your location".into()));
    }

    let existing = sqlx::query("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::UserExists);
    }

    let role = body.role.unwrap_or(Role::Farmer);
    let password_hash = hash_password(&body.password, config.bcrypt_cost)?;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, phone, location, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(&name)
    .bind(&email)
    .bind(&password_hash)
    .bind(&body.phone)
    .bind(&location)
    .bind(role.as_str())
    .execute(&pool)
    .await?;

    let token = issue_token(id, role, &config)?;
    info!("new {} account registered: {}", role.as_str(), id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User created successfully",
            "data": {
                "id": id,
                "name": name,
                "email": email,
                "role": role,
                "phone": body.phone,
                "location": location,
            },
            "token": token,
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State((pool, config)): State<(PgPool, Config)>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    // ---
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "Please provide email and password".into(),
        ));
    }

    let email = body.email.trim().to_lowercase();
    let row = sqlx::query(
        r#"
        SELECT id, name, email, password_hash, phone, location, role, is_active
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(&email)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    let password_hash: String = row.get("password_hash");
    if !verify_password(&body.password, &password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    if !row.get::<bool, _>("is_active") {
        return Err(AppError::AccountDeactivated);
    }

    let id: Uuid = row.get("id");
    let role: Role = row
        .get::<String, _>("role")
        .parse()
        .map_err(AppError::internal)?;
    let token = issue_token(id, role, &config)?;
    info!("login: {}", id);

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "data": {
                "id": id,
                "name": row.get::<String, _>("name"),
                "email": row.get::<String, _>("email"),
                "role": role,
                "phone": row.get::<String, _>("phone"),
                "location": row.get::<String, _>("location"),
            },
            "token": token,
        })),
    ))
}

// ---

pub(crate) fn validate_name(name: &str) -> Result<(), AppError> {
    if name.chars().count() < 2 {
        return Err(AppError::Validation(
            "Name must be at least 2 characters long".into(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    // ---
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Please provide a valid email address".into(),
        ))
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_phone(phone: &str) -> Result<(), AppError> {
    if phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::Validation("Phone number must be 10 digits".into()))
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_email_validation() {
        // ---
        assert!(validate_email("ravi@farm.example.com").is_ok());
        assert!(validate_email("ravi@farm").is_err());
        assert!(validate_email("@farm.example.com").is_err());
        assert!(validate_email("ravi@.com").is_err());
        assert!(validate_email("no-at-sign").is_err());
    }

    #[test]
    fn test_phone_validation() {
        // ---
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("98765").is_err());
        assert!(validate_phone("98765432100").is_err());
        assert!(validate_phone("98765x3210").is_err());
    }

    #[test]
    fn test_name_and_password_lengths() {
        // ---
        assert!(validate_name("Ra").is_ok());
        assert!(validate_name("R").is_err());
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
    }
}
