use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use floorpath_core::NavError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("no venue loaded")]
    NotReady,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<NavError> for AppError {
    fn from(e: NavError) -> Self {
        match e {
            NavError::UnknownFloor(_) | NavError::UnknownRoom { .. } => AppError::NotFound(e.to_string()),
            NavError::InvalidLabel(_) => AppError::BadRequest(e.to_string()),
            other => AppError::Internal(other.into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorPayload<'a>,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::NotReady => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        let message = match self {
            AppError::BadRequest(m) | AppError::NotFound(m) => m,
            other => other.to_string(),
        };
        let body = ErrorBody { error: ErrorPayload { code, message } };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorpath_core::FloorId;

    #[test]
    fn structural_core_errors_map_to_not_found() {
        let e: AppError = NavError::UnknownFloor(FloorId(9)).into();
        assert!(matches!(e, AppError::NotFound(_)));
        assert_eq!(e.into_response().status(), StatusCode::NOT_FOUND);

        let e: AppError = NavError::NoPathFound.into();
        assert_eq!(e.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
