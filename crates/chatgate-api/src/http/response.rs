//! Envelope response format for all API responses.
//!
//! Every response, success or error, is wrapped in the same envelope:
//! ```json
//! { "code": 0, "message": "", "data": { ... }, "timestamp": 1714560000000 }
//! ```
//! `data` is never `null`; an absent payload becomes `{}`. The HTTP status
//! is chosen by the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chatgate_types::config::EnvelopeCodes;

use crate::http::error::AppError;

/// The uniform response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i64,
    pub message: String,
    pub data: Value,
    /// Creation instant, Unix milliseconds.
    pub timestamp: i64,
}

impl Envelope {
    fn new(code: i64, message: &str, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: normalize_data(data),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

fn normalize_data(data: Option<Value>) -> Value {
    match data {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value) => value,
    }
}

/// Error `code` priority: explicit, then configured default, then the HTTP
/// status.
pub fn resolve_error_code(explicit: Option<i64>, configured: Option<i64>, status: StatusCode) -> i64 {
    explicit
        .or(configured)
        .unwrap_or_else(|| i64::from(status.as_u16()))
}

/// An envelope paired with its HTTP status.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub envelope: Envelope,
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// Builds envelopes with the configured success and error codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Responder {
    codes: EnvelopeCodes,
}

impl Responder {
    pub fn new(codes: EnvelopeCodes) -> Self {
        Self { codes }
    }

    /// 200 with `data` and an empty message.
    pub fn success<T: Serialize>(&self, data: T) -> ApiResponse {
        self.success_with(StatusCode::OK, "", data)
    }

    pub fn success_with<T: Serialize>(&self, status: StatusCode, message: &str, data: T) -> ApiResponse {
        match serde_json::to_value(data) {
            Ok(value) => ApiResponse {
                status,
                envelope: Envelope::new(self.codes.success_code, message, Some(value)),
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response payload");
                self.error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to serialize response")
            }
        }
    }

    /// Error envelope with no explicit code and `{}` data.
    pub fn error(&self, status: StatusCode, message: &str) -> ApiResponse {
        self.error_with(status, message, None, None)
    }

    pub fn error_with(
        &self,
        status: StatusCode,
        message: &str,
        code: Option<i64>,
        data: Option<Value>,
    ) -> ApiResponse {
        let code = resolve_error_code(code, self.codes.error_code, status);
        ApiResponse {
            status,
            envelope: Envelope::new(code, message, data),
        }
    }

    /// Render an [`AppError`] with its status and public message.
    pub fn failure(&self, err: AppError) -> ApiResponse {
        self.error(err.status(), err.message())
    }

    /// Render either outcome of a handler.
    pub fn respond(&self, result: Result<ApiResponse, AppError>) -> ApiResponse {
        result.unwrap_or_else(|err| self.failure(err))
    }
}
