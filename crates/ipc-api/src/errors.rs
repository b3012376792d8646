use crate::dto::ApiResponse;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::IntoResponse,
};
use ipc_core::IpcError;
use ipc_source::SourceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unprocessable: {0}")]
    Unprocessable(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Internal server error")]
    InternalServerError,
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        // NOTE: Error is already logged by the dataset source
        if err.is_retryable() {
            Self::ServiceUnavailable(err.user_message().to_string())
        } else {
            Self::InternalServerError
        }
    }
}

impl From<IpcError> for ApiError {
    fn from(err: IpcError) -> Self {
        match err {
            IpcError::InvalidInput(msg) => Self::BadRequest(msg),
            IpcError::InsufficientData { .. } | IpcError::Overflow { .. } => {
                Self::Unprocessable(err.to_string())
            }
            IpcError::EmptyDataset | IpcError::MissingColumn { .. } | IpcError::Csv(_) => {
                tracing::error!(error = %err, "IPC dataset has an unexpected layout");
                Self::ServiceUnavailable(
                    "The data received from the INDEC server could not be read. Please try again later."
                        .to_string(),
                )
            }
            IpcError::DivisionByZero { .. } => {
                tracing::error!(error = %err, "Unexpected IPC computation error");
                Self::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };
        let response: ApiResponse<()> = ApiResponse::error(msg);
        let mut response = (status, Json(response)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"ipc-admin\""),
            );
        }
        response
    }
}
