//! JSON error envelope and the mapping from service errors to HTTP statuses.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde::Serialize;
use tracing::error;

use services::{ErrorKind, LedgerError, QueryError, UserServiceError};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by every handler, rendered as `{ "code", "message" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: &'a str,
}

impl ApiError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invalid, message)
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_service(kind: ErrorKind, err: &dyn std::error::Error) -> Self {
        if kind == ErrorKind::Internal {
            error!(error = %err, "request failed");
        }
        Self::new(kind, err.to_string())
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InsufficientFunds => StatusCode::CONFLICT,
        ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(self.kind)
    }

    fn error_response(&self) -> HttpResponse {
        // Internal details stay in the logs.
        let message = match self.kind {
            ErrorKind::Internal => INTERNAL_MESSAGE,
            _ => self.message.as_str(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            code: self.kind.as_str(),
            message,
        })
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::from_service(err.kind(), &err)
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self::from_service(err.kind(), &err)
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        Self::from_service(err.kind(), &err)
    }
}

//
// ─── EXTRACTOR CONFIG ──────────────────────────────────────────────────────────
//

/// JSON body extractor that reports malformed payloads as `invalid`.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        ApiError::invalid(err.to_string()).into()
    })
}

/// Path extractor that reports malformed ids as `invalid`.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
        ApiError::invalid(err.to_string()).into()
    })
}

/// Query extractor that reports malformed parameters as `invalid`.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        ApiError::invalid(err.to_string()).into()
    })
}
