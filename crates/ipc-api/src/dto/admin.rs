use ipc_source::{ErrorOrigin, FetchStatus, SourceError};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured description of a dataset fetch failure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FetchErrorInfo {
    pub code: String,
    pub origin: ErrorOrigin,
    pub message: String,
    pub detail: Option<String>,
}

impl From<&SourceError> for FetchErrorInfo {
    fn from(err: &SourceError) -> Self {
        Self {
            code: err.code().to_string(),
            origin: err.origin(),
            message: err.user_message().to_string(),
            detail: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkippedRowDTO {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatasetSummary {
    pub records: usize,
    pub points: usize,
    pub first_month: Option<String>,
    pub last_month: Option<String>,
    pub skipped: Vec<SkippedRowDTO>,
    /// Errors of the months whose variation could not be computed
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminStatusDTO {
    pub source: String,
    pub fetch: Option<FetchStatus>,
    pub error: Option<FetchErrorInfo>,
    pub dataset: Option<DatasetSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheClearedDTO {
    pub removed: bool,
}
