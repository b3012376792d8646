use serde::Serialize;
use strum::Display;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request to the dataset source timed out: {0}")]
    Timeout(String),

    #[error("Could not connect to the dataset source: {0}")]
    Connection(String),

    #[error("Dataset source answered with HTTP {status}")]
    HttpStatus { status: u16, reason: Option<String> },

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("Invalid dataset received: {0}")]
    InvalidResponse(String),

    #[error("Cache error: {0}")]
    Cache(#[from] std::io::Error),
}

/// Which side of the integration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorOrigin {
    ExternalService,
    Internal,
}

impl SourceError {
    /// Stable identifier exposed to API clients.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Connection(_) => "connection_error",
            Self::HttpStatus { .. } => "http_error",
            Self::Request(_) => "request_error",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Cache(_) => "cache_error",
        }
    }

    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Cache(_) => ErrorOrigin::Internal,
            _ => ErrorOrigin::ExternalService,
        }
    }

    /// Failures of the remote source may go away on their own.
    pub const fn is_retryable(&self) -> bool {
        matches!(self.origin(), ErrorOrigin::ExternalService)
    }

    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Timeout(_) => {
                "The INDEC server took too long to respond. Please try again later."
            }
            Self::Connection(_) => {
                "Could not connect to the INDEC server to fetch the IPC data. Check the connection and try again."
            }
            Self::HttpStatus { .. } => {
                "The INDEC server answered with an error. Please try again later."
            }
            Self::Request(_) => {
                "Could not fetch the IPC data from the INDEC server. Please try again later."
            }
            Self::InvalidResponse(_) => {
                "The data received from the INDEC server could not be read. Please try again later."
            }
            Self::Cache(_) => {
                "The stored IPC data could not be read. Clear the cache and try again."
            }
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().map(str::to_string),
            }
        } else {
            Self::Request(err.to_string())
        }
    }
}
