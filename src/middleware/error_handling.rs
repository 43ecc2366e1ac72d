use crate::error::AppError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

/// Stable wire format for failures: every error surfaces as a
/// (kind, human-readable message) pair plus routing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
    pub error_type: String,
    pub code: String,
}

pub fn map_error(err: &AppError) -> (StatusCode, ErrorResponse) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let (error_type, code) = match err {
        AppError::BadRequest(_) => ("validation_error", "INVALID_REQUEST"),
        AppError::Unauthorized => ("authentication_error", "UNAUTHORIZED"),
        AppError::Forbidden => ("authorization_error", "FORBIDDEN"),
        AppError::NotFound => ("not_found_error", "NOT_FOUND"),
        AppError::Conflict(_) => ("conflict_error", "CONFLICT"),
        AppError::Config(_) | AppError::StartServer(_) => ("server_error", "INTERNAL_SERVER_ERROR"),
        AppError::Database(_) => ("server_error", "DATABASE_ERROR"),
        AppError::Internal => ("server_error", "INTERNAL_SERVER_ERROR"),
    };

    let response = ErrorResponse {
        error: match status {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::CONFLICT => "Conflict",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
        .to_string(),
        message: err.to_string(),
        status: status.as_u16(),
        error_type: error_type.to_string(),
        code: code.to_string(),
    };

    (status, response)
}

pub fn into_response(err: AppError) -> impl IntoResponse {
    let (status, response) = map_error(&err);
    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_client_errors_to_their_status() {
        let (status, body) = map_error(&AppError::BadRequest("empty message".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error_type, "validation_error");

        let (status, _) = map_error(&AppError::Forbidden);
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = map_error(&AppError::NotFound);
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = map_error(&AppError::Conflict("room exists".into()));
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn database_errors_stay_generic() {
        let (status, body) = map_error(&AppError::Database(sqlx::Error::RowNotFound));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "DATABASE_ERROR");
    }
}
