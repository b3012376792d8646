use chrono::NaiveDate;
use ipc_core::{DerivedSeries, YearMonth, derive_series};
use ipc_source::FetchStatus;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::{AppState, errors::ApiError};

/// Fetches the dataset and runs the derivation pipeline over it.
pub async fn load_series(state: &AppState) -> Result<(DerivedSeries, FetchStatus), ApiError> {
    let dataset = state.source.fetch().await?;
    if dataset.status.stale {
        tracing::warn!(
            error = dataset.status.error.as_deref().unwrap_or_default(),
            "Serving stale IPC dataset"
        );
    }
    let series = derive_series(&dataset.text)?;
    Ok((series, dataset.status))
}

/// Accepts `YYYY-MM-DD` or `YYYY-MM` (first day of the month).
pub fn parse_contract_start(raw: &str) -> Result<NaiveDate, ApiError> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    YearMonth::from_str(trimmed)
        .map(YearMonth::first_day)
        .map_err(|_| {
            ApiError::BadRequest(format!(
                "Invalid fecha_inicio_contrato '{trimmed}', expected YYYY-MM-DD or YYYY-MM"
            ))
        })
}

pub fn parse_base_rent(raw: &str) -> Result<Decimal, ApiError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .map_err(|_| ApiError::BadRequest(format!("Invalid alquiler_base '{trimmed}'")))
}

/// Constant-time comparison of the provided credentials against the configured ones.
pub fn credentials_match(expected: &str, provided: &str) -> bool {
    let expected = expected.as_bytes();
    let provided = provided.as_bytes();
    if expected.len() != provided.len() {
        return false;
    }
    expected
        .iter()
        .zip(provided)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
