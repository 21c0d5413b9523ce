//! Service error type mapped onto the HTTP response envelope.
//!
//! Every failure path leaves the service as `{"success": false, "message"}`
//! with the matching status code. Internal errors keep their source for the
//! log but leak only a generic message to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

// ---

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Your account has been deactivated")]
    AccountDeactivated,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Access forbidden")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("User with this email already exists")]
    UserExists,

    #[error("Internal server error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AppError::Internal(Box::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // ---
        // The only unique column is users.email; a violation means a
        // signup lost the existence-check race.
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return AppError::UserExists;
            }
        }
        if matches!(err, sqlx::Error::RowNotFound) {
            return AppError::UserNotFound;
        }
        AppError::internal(err)
    }
}

/// JSON body shared by every error response.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::AccountDeactivated | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::UserExists => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let AppError::Internal(source) = &self {
            tracing::error!("request failed: {source}");
        }

        (
            status,
            Json(ErrorBody {
                success: false,
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_status_mapping() {
        // ---
        let cases = [
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::UserNotFound, StatusCode::NOT_FOUND),
            (AppError::UserExists, StatusCode::CONFLICT),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_row_not_found_maps_to_missing_user() {
        // ---
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::UserNotFound));
    }
}
