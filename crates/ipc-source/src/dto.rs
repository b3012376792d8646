use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How the dataset of the current request was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FetchStatus {
    pub source: String,
    pub used_cache: bool,
    pub updated: bool,
    /// The cached copy is older than the TTL and could not be refreshed.
    pub stale: bool,
    pub error: Option<String>,
    pub etag: Option<String>,
    pub last_modified_header: Option<String>,
    pub last_cached_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl FetchStatus {
    pub const fn new(source: String) -> Self {
        Self {
            source,
            used_cache: false,
            updated: false,
            stale: false,
            error: None,
            etag: None,
            last_modified_header: None,
            last_cached_at: None,
            last_checked_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawDataset {
    pub text: String,
    pub status: FetchStatus,
}

/// Validators of the cached copy, stored next to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}
