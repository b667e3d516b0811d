use crate::application_port::AuthError;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

/// Client-facing error body. Deliberately vague: which of email or
/// password was wrong, or why a token was rejected, stays server-side.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("access denied")]
    Forbidden,
    #[error("internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCredentials | ApiErrorCode::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("internal error: {error}");
        ApiErrorCode::InternalError
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::Unauthenticated => ApiErrorCode::Unauthenticated,
            AuthError::Forbidden => ApiErrorCode::Forbidden,
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::Internal(e) => ApiErrorCode::internal(e),
        }
    }
}

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(code) = err.find::<ApiErrorCode>() {
        Ok(reply_with(code.status(), &code.to_string()))
    } else if err.is_not_found() {
        Ok(reply_with(StatusCode::NOT_FOUND, "not found"))
    } else if err.find::<warp::reject::MissingHeader>().is_some() {
        // Only the bearer filter requires a header, so a missing one is a
        // missing credential.
        Ok(reply_with(
            StatusCode::UNAUTHORIZED,
            &ApiErrorCode::Unauthenticated.to_string(),
        ))
    } else {
        warn!("unhandled rejection: {err:?}");
        Ok(reply_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            &ApiErrorCode::InternalError.to_string(),
        ))
    }
}

fn reply_with(status: StatusCode, message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    let json = warp::reply::json(&ErrorBody {
        message: message.to_string(),
    });
    warp::reply::with_status(json, status)
}
