use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::{
    AppState,
    dto::{DEFAULT_LATEST_COUNT, IpcPoint, LatestIpcQuery, LatestIpcResponse, MAX_LATEST_COUNT},
    errors::ApiError,
    helpers::load_series,
};

#[utoipa::path(
    get,
    path = "/ipc/ultimos",
    tag = "IPC",
    params(
        ("n" = Option<u32>, Query, description = "Number of months to return (1..=1200)", example = 12)
    ),
    responses(
        (status = 200, description = "Latest monthly IPC variations, oldest first", body = LatestIpcResponse),
        (status = 400, description = "Invalid parameters"),
        (status = 503, description = "Dataset source unavailable")
    )
)]
pub async fn get_latest_ipc(
    State(state): State<AppState>,
    query: Result<Query<LatestIpcQuery>, QueryRejection>,
) -> Result<Json<LatestIpcResponse>, ApiError> {
    let Query(params) =
        query.map_err(|_| ApiError::BadRequest("Invalid parameter n".to_string()))?;
    let n = params.n.unwrap_or(DEFAULT_LATEST_COUNT);
    if !(1..=MAX_LATEST_COUNT).contains(&n) {
        return Err(ApiError::BadRequest(format!(
            "Parameter n must be between 1 and {MAX_LATEST_COUNT}"
        )));
    }

    let (series, status) = load_series(&state).await?;
    let data: Vec<IpcPoint> = series.latest(n as usize).iter().map(IpcPoint::from).collect();

    Ok(Json(LatestIpcResponse {
        source: status.source,
        last_month: data.last().map(|p| p.mes.clone()),
        count: data.len(),
        data,
    }))
}
