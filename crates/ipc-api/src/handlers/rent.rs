use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use chrono::Local;
use ipc_core::{RentRequest, default_horizon, generate_rent_table, monthly_schedule};

use crate::{
    AppState,
    dto::{DEFAULT_UPDATE_PERIOD_MONTHS, RentTableQuery, RentTableResponse},
    errors::ApiError,
    helpers::{load_series, parse_base_rent, parse_contract_start},
};

/// Upper bound for the monthly table, 100 years.
const MAX_TABLE_MONTHS: u32 = 1200;

#[utoipa::path(
    get,
    path = "/alquiler/tabla",
    tag = "Alquiler",
    params(
        ("alquiler_base" = String, Query, description = "Initial monthly rent", example = "100000"),
        ("fecha_inicio_contrato" = String, Query, description = "Contract start, YYYY-MM-DD or YYYY-MM", example = "2024-01-01"),
        ("periodo_actualizacion_meses" = Option<u32>, Query, description = "Months between updates (1..=1200)", example = 3),
        ("meses" = Option<u32>, Query, description = "Months shown in the monthly table, defaults to the end of the current year")
    ),
    responses(
        (status = 200, description = "Rent adjustment schedule", body = RentTableResponse),
        (status = 400, description = "Missing or invalid parameters"),
        (status = 422, description = "Not enough IPC data for a full period"),
        (status = 503, description = "Dataset source unavailable")
    )
)]
pub async fn get_rent_table(
    State(state): State<AppState>,
    query: Result<Query<RentTableQuery>, QueryRejection>,
) -> Result<Json<RentTableResponse>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (Some(base), Some(start)) = (
        params.alquiler_base.as_deref().filter(|s| !s.trim().is_empty()),
        params.fecha_inicio_contrato.as_deref().filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Missing parameters: alquiler_base and fecha_inicio_contrato are required".to_string(),
        ));
    };

    let request = RentRequest::new(
        parse_base_rent(base)?,
        parse_contract_start(start)?,
        params
            .periodo_actualizacion_meses
            .unwrap_or(DEFAULT_UPDATE_PERIOD_MONTHS),
    )?;

    let today = Local::now().date_naive();
    let horizon = params
        .meses
        .unwrap_or_else(|| default_horizon(request.start_month(), today))
        .min(MAX_TABLE_MONTHS);

    let (series, status) = load_series(&state).await?;
    let periods = generate_rent_table(&series.points, &request)?;
    let rows = monthly_schedule(&series.points, &request, horizon, today)?;

    tracing::debug!(
        start = %request.contract_start(),
        period_months = request.period_months(),
        periods = periods.len(),
        rows = rows.len(),
        "Built rent table"
    );

    Ok(Json(RentTableResponse {
        source: status.source,
        alquiler_base: request.base_rent(),
        fecha_inicio_contrato: request.contract_start(),
        periodo_actualizacion_meses: request.period_months(),
        periodos: periods.into_iter().map(Into::into).collect(),
        tabla: rows.into_iter().map(Into::into).collect(),
    }))
}
