use serde::Deserialize;
use utoipa::ToSchema;

pub const DEFAULT_LATEST_COUNT: u32 = 12;
pub const MAX_LATEST_COUNT: u32 = 1200;
pub const DEFAULT_UPDATE_PERIOD_MONTHS: u32 = 3;

/// Query parameters for the latest IPC endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct LatestIpcQuery {
    pub n: Option<u32>,
}

/// Query parameters for the rent table endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct RentTableQuery {
    pub alquiler_base: Option<String>,
    /// `YYYY-MM-DD` or `YYYY-MM`
    pub fecha_inicio_contrato: Option<String>,
    pub periodo_actualizacion_meses: Option<u32>,
    /// Number of months shown in the monthly table
    pub meses: Option<u32>,
}
