use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Domain outcomes surfaced at the HTTP boundary. Not-found deliberately
/// covers both "no such id" and "owned by someone else" so callers cannot
/// probe for other users' tasks.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Task not found")]
    NotFound,
    #[error("Invalid or missing credentials")]
    Auth,
    #[error("{0}")]
    Conflict(String),
    #[error("database error")]
    Storage(#[from] rusqlite::Error),
    #[error("internal error")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Auth => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) | Self::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Storage(err) => log::error!("storage failure: {err}"),
            Self::Token(err) => log::error!("token encoding failure: {err}"),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
