use chrono::NaiveDate;
use ipc_core::{RentAdjustment, RentMonth, RentPeriod, ScheduleRow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RentPeriodDTO {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Compounded variation over the period, in percent
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 3.03)]
    pub compounded_variation: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub rent_before: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 103_030)]
    pub adjusted_rent: Decimal,
}

impl From<RentPeriod> for RentPeriodDTO {
    fn from(period: RentPeriod) -> Self {
        Self {
            period_start: period.period_start,
            period_end: period.period_end,
            compounded_variation: period.compounded_variation,
            rent_before: period.rent_before,
            adjusted_rent: period.adjusted_rent,
        }
    }
}

/// One month of the contract
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RentMonthDTO {
    /// `YYYY-MM`
    pub ym: String,
    /// Spanish label, e.g. `Marzo 2024`
    pub mes: String,
    /// Rent payable for the month
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub valor: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub ipc: Option<Decimal>,
    pub provisorio: bool,
    pub future: bool,
    pub periodo: u32,
    pub offset: u32,
}

impl From<RentMonth> for RentMonthDTO {
    fn from(month: RentMonth) -> Self {
        Self {
            ym: month.month.to_string(),
            mes: month.label,
            valor: month.rent,
            ipc: month.ipc_mensual,
            provisorio: month.provisional,
            future: month.future,
            periodo: month.period,
            offset: month.offset,
        }
    }
}

/// Increase applied on the month right before it in the table
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RentAdjustmentDTO {
    /// `YYYY-MM`
    pub ym: String,
    /// e.g. `Ajuste Marzo 2024`
    pub mes: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 3030)]
    pub valor: Decimal,
    pub future: bool,
    pub periodo: u32,
}

impl From<RentAdjustment> for RentAdjustmentDTO {
    fn from(adjustment: RentAdjustment) -> Self {
        Self {
            ym: adjustment.month.to_string(),
            mes: adjustment.label,
            valor: adjustment.amount,
            future: adjustment.future,
            periodo: adjustment.period,
        }
    }
}

/// Row of the monthly table, discriminated by `tipo`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "tipo", rename_all = "lowercase")]
pub enum RentRowDTO {
    Mes(RentMonthDTO),
    Ajuste(RentAdjustmentDTO),
}

impl From<ScheduleRow> for RentRowDTO {
    fn from(row: ScheduleRow) -> Self {
        match row {
            ScheduleRow::Month(month) => Self::Mes(month.into()),
            ScheduleRow::Adjustment(adjustment) => Self::Ajuste(adjustment.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RentTableResponse {
    pub source: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub alquiler_base: Decimal,
    pub fecha_inicio_contrato: NaiveDate,
    pub periodo_actualizacion_meses: u32,
    pub periodos: Vec<RentPeriodDTO>,
    pub tabla: Vec<RentRowDTO>,
}
