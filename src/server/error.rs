use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::Error;
use crate::api::ErrorBody;

/// A classified error on its way to an HTTP response.
///
/// The status and `error` kind come from the error variant. Raw store text is
/// only attached as `detail` when the server was started with detail exposure.
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    expose_detail: bool,
}

impl ApiError {
    pub fn new(error: Error, expose_detail: bool) -> Self {
        Self {
            error,
            expose_detail,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Store(_) | Error::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, internal) = match &self.error {
            Error::InvalidArgument(msg) => (msg.clone(), false),
            Error::NotFound(id) => (format!("student {} not found", id), false),
            Error::StoreUnavailable(_) => ("store unavailable".to_string(), true),
            Error::Store(_) => ("store operation failed".to_string(), true),
            Error::Task(_) => ("internal error".to_string(), true),
        };

        ErrorBody {
            error: self.error.kind().to_string(),
            message,
            detail: (internal && self.expose_detail).then(|| self.error.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.error.kind(), "Request failed: {}", self.error);
        } else {
            tracing::debug!(kind = self.error.kind(), "Request rejected: {}", self.error);
        }

        (status, Json(self.body())).into_response()
    }
}
