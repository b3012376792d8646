use axum::{Json, extract::State, response::IntoResponse};
use ipc_core::derive_series;

use crate::{
    AppState,
    dto::{
        AdminStatusDTO, ApiResponse, CacheClearedDTO, DatasetSummary, FetchErrorInfo,
        SkippedRowDTO,
    },
    errors::ApiError,
};

#[utoipa::path(
    get,
    path = "/admin/estado",
    tag = "Admin",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Dataset source status", body = ApiResponse<AdminStatusDTO>),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
pub async fn get_admin_status(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let source = state.source.source_url().to_string();

    // Fetch failures are part of the report rather than an error response.
    let dataset = match state.source.fetch().await {
        Ok(dataset) => dataset,
        Err(err) => {
            return Ok(Json(ApiResponse::ok(AdminStatusDTO {
                source,
                fetch: None,
                error: Some(FetchErrorInfo::from(&err)),
                dataset: None,
            })));
        }
    };

    let series = derive_series(&dataset.text)?;
    let summary = DatasetSummary {
        records: series.records.len(),
        points: series.points.len(),
        first_month: series.records.first().map(|r| r.month.to_string()),
        last_month: series.last_month().map(|m| m.to_string()),
        skipped: series
            .skipped
            .iter()
            .map(|row| SkippedRowDTO {
                line: row.line,
                reason: row.reason.clone(),
            })
            .collect(),
        failed: series.failed.iter().map(ToString::to_string).collect(),
    };

    Ok(Json(ApiResponse::ok(AdminStatusDTO {
        source,
        fetch: Some(dataset.status),
        error: None,
        dataset: Some(summary),
    })))
}

#[utoipa::path(
    delete,
    path = "/admin/cache",
    tag = "Admin",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Cached dataset removed", body = ApiResponse<CacheClearedDTO>),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
pub async fn clear_cache(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let removed = state.source.clear_cache().await?;
    Ok(Json(ApiResponse::ok(CacheClearedDTO { removed })))
}
