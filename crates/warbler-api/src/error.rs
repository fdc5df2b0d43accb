use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use thiserror::Error;
use tracing::error;

use warbler_db::DbError;
use warbler_types::api::ErrorResponse;

use crate::credentials::CredentialError;
use crate::flash;

pub const ACCESS_UNAUTHORIZED: &str = "Access unauthorized.";

/// Request-terminal failures. None of them are retried; whatever the handler
/// had not yet committed is left untouched.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid credentials.")]
    InvalidCredentials,

    /// Anonymous, or the wrong user, on a gated endpoint.
    /// Carries the request's cookies so the flash is appended to them.
    #[error("Access unauthorized.")]
    Unauthorized(CookieJar),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(msg) => ApiError::Conflict(msg),
            DbError::Constraint(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Missing(_) => ApiError::Validation(err.to_string()),
            CredentialError::Hash(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized(jar) => {
                let jar = flash::push(jar.clone(), flash::DANGER, ACCESS_UNAUTHORIZED);
                return (jar, Redirect::to("/")).into_response();
            }
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(msg) => {
                error!("Request failed: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            ApiError::Internal(_) => "Something went wrong.".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: body })).into_response()
    }
}
