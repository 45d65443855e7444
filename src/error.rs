use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use leptos::logging;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid CSRF token")]
    Csrf,
    #[error("integrity error: {0}")]
    Integrity(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn not_found(what: &str, id: i64) -> Self {
        AppError::NotFound(format!("{} {}", what, id))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Csrf => StatusCode::BAD_REQUEST,
            AppError::Integrity(_) | AppError::Database(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            logging::error!("[API ERROR] {}", self);
            // Internal details stay in the log
            return HttpResponse::build(status).body("Internal server error");
        }
        logging::warn!("[API] {} {}", status.as_u16(), self);
        HttpResponse::build(status).body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Forbidden("nope").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("abstract", 3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Csrf.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(rusqlite::Error::QueryReturnedNoRows).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let response = AppError::Integrity("two reviews".into()).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
