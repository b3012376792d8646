use ipc_core::VariationPoint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IpcPoint {
    /// `YYYY-MM`
    pub mes: String,
    /// Monthly variation in percent, one decimal
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 1.6)]
    pub ipc_mensual: Decimal,
}

impl From<&VariationPoint> for IpcPoint {
    fn from(point: &VariationPoint) -> Self {
        Self {
            mes: point.month.to_string(),
            ipc_mensual: point.ipc_mensual,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LatestIpcResponse {
    pub source: String,
    pub last_month: Option<String>,
    pub count: usize,
    pub data: Vec<IpcPoint>,
}
