use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Error kinds the API answers with, instead of leaving clients to match
/// on message strings. `kind` is stable; `message` is display text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DuplicateSubmission(String),

    #[error("{0}")]
    MissingPrerequisite(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Gagal menyimpan foto: {0}")]
    UploadFailed(String),

    #[error("Permintaan ke layanan eksternal gagal: {0}")]
    Upstream(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_failed",
            ApiError::DuplicateSubmission(_) => "duplicate_submission",
            ApiError::MissingPrerequisite(_) => "missing_prerequisite",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::UploadFailed(_) => "upload_failed",
            ApiError::Upstream(_) => "upstream_failed",
            ApiError::Database(_) => "internal",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MissingPrerequisite(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateSubmission(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::UploadFailed(_) | ApiError::Upstream(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Database(e) = self {
            tracing::error!(error = %e, "database error");
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "kind": "internal",
                "message": "Internal Server Error"
            }));
        }

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "kind": self.kind(),
            "message": self.to_string()
        }))
    }
}

/// MySQL duplicate-key SQLSTATE, the backstop for every compound unique
/// key this schema relies on.
pub fn is_duplicate_key(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23000"),
        _ => false,
    }
}
