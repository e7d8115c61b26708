//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while turning failures into a
//! consistent JSON envelope: `{"message": ..., "traceId": ...}`. Server-side
//! failures are logged in full and redacted before they reach the client.

use actix_multipart::MultipartError;
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER, TraceId};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Message returned in place of any 5xx detail.
pub const REDACTED_MESSAGE: &str = "Server error";

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable description.
    #[schema(example = "Invalid email or password")]
    pub message: String,
    /// Correlation id, also sent in the `trace-id` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Field-level context for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn trace_id_of(error: &Error) -> Option<String> {
    error
        .trace_id()
        .map(str::to_owned)
        .or_else(|| TraceId::current().map(|id| id.to_string()))
}

fn body_for(error: &Error, status: StatusCode) -> ErrorResponse {
    let trace_id = trace_id_of(error);
    if status.is_server_error() {
        ErrorResponse {
            message: REDACTED_MESSAGE.to_owned(),
            trace_id,
            details: None,
        }
    } else {
        ErrorResponse {
            message: error.message().to_owned(),
            trace_id,
            details: error.details().cloned(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = body_for(self, status);
        if status.is_server_error() {
            error!(trace_id = ?body.trace_id, error = %self, "request failed");
        } else {
            debug!(trace_id = ?body.trace_id, %status, error = %self, "request rejected");
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = &body.trace_id {
            builder.insert_header((TRACE_ID_HEADER, id.clone()));
        }
        builder.json(body)
    }
}

/// Turn malformed JSON bodies into 400 responses.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Content type must be application/json".to_owned(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large".to_owned()
        }
        other => format!("Invalid JSON body: {other}"),
    };
    Error::invalid_request(message).into()
}

/// Turn malformed query strings into 400 responses.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("Invalid query string: {err}")).into()
}

/// Turn malformed multipart bodies into 400 responses.
pub fn multipart_error_handler(err: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("Invalid multipart body: {err}")).into()
}
