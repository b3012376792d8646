//! Rent adjustment schedules driven by the monthly IPC variation.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    error::IpcError,
    month::YearMonth,
    rounding::{round_half_away, round_units},
    variation::VariationPoint,
};

/// Longest accepted update period, 100 years.
pub const MAX_PERIOD_MONTHS: u32 = 1200;

/// Validated rent table parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentRequest {
    base_rent: Decimal,
    contract_start: NaiveDate,
    period_months: u32,
}

impl RentRequest {
    pub fn new(
        base_rent: Decimal,
        contract_start: NaiveDate,
        period_months: u32,
    ) -> Result<Self, IpcError> {
        if base_rent <= Decimal::ZERO {
            return Err(IpcError::InvalidInput(
                "Base rent must be greater than zero".to_string(),
            ));
        }
        if !(1..=MAX_PERIOD_MONTHS).contains(&period_months) {
            return Err(IpcError::InvalidInput(format!(
                "Update period must be between 1 and {MAX_PERIOD_MONTHS} months, got {period_months}"
            )));
        }
        Ok(Self {
            base_rent,
            contract_start,
            period_months,
        })
    }

    pub const fn base_rent(&self) -> Decimal {
        self.base_rent
    }

    pub const fn contract_start(&self) -> NaiveDate {
        self.contract_start
    }

    pub const fn period_months(&self) -> u32 {
        self.period_months
    }

    pub fn start_month(&self) -> YearMonth {
        YearMonth::from_date(self.contract_start)
    }

    fn period_len(&self) -> i32 {
        // Bounded by MAX_PERIOD_MONTHS in `new`.
        i32::try_from(self.period_months).unwrap_or(i32::MAX)
    }
}

/// One fully covered adjustment period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RentPeriod {
    pub index: usize,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Compounded variation over the period, in percent (two decimals).
    pub compounded_variation: Decimal,
    pub rent_before: Decimal,
    /// Rent that applies once the period is over.
    pub adjusted_rent: Decimal,
}

/// Compounds the variations of each consecutive `period_months` window,
/// starting at the contract start month.
///
/// Stops at the first window that is not fully covered by `points`.
pub fn generate_rent_table(
    points: &[VariationPoint],
    request: &RentRequest,
) -> Result<Vec<RentPeriod>, IpcError> {
    let by_month = index_points(points);
    let start = request.start_month();
    let len = request.period_len();

    let mut rent = round_units(request.base_rent);
    let mut first = start;
    let mut periods = Vec::new();

    loop {
        let window: Vec<YearMonth> = (0..len).map(|offset| first.add_months(offset)).collect();
        let Some(factor) = compounded_factor(&by_month, &window)? else {
            break;
        };

        let overflow = || IpcError::Overflow { month: first };
        let adjusted_rent = rent.checked_mul(factor).map(round_units).ok_or_else(overflow)?;
        let compounded_variation = factor
            .checked_sub(Decimal::ONE)
            .and_then(|growth| growth.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| round_half_away(pct, 2))
            .ok_or_else(overflow)?;

        periods.push(RentPeriod {
            index: periods.len(),
            period_start: first.first_day(),
            period_end: first.add_months(len - 1).last_day(),
            compounded_variation,
            rent_before: rent,
            adjusted_rent,
        });
        rent = adjusted_rent;
        first = first.add_months(len);
    }

    if periods.is_empty() {
        let available = points.iter().filter(|p| p.month >= start).count();
        return Err(IpcError::InsufficientData {
            required: request.period_months as usize,
            available,
        });
    }

    tracing::debug!(
        start = %start,
        period_months = request.period_months,
        periods = periods.len(),
        "Generated rent table"
    );

    Ok(periods)
}

/// A month of the contract as the tenant sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RentMonth {
    pub month: YearMonth,
    pub label: String,
    /// Rent payable for the month.
    pub rent: Decimal,
    pub ipc_mensual: Option<Decimal>,
    /// The period's update could not be computed yet, the previous rent is kept.
    pub provisional: bool,
    pub future: bool,
    pub period: u32,
    pub offset: u32,
}

/// Increase applied at the start of a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RentAdjustment {
    pub month: YearMonth,
    /// e.g. `Ajuste Abril 2024`
    pub label: String,
    pub amount: Decimal,
    pub future: bool,
    pub period: u32,
}

/// A row of the monthly table. Adjustments follow the month they apply to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScheduleRow {
    Month(RentMonth),
    Adjustment(RentAdjustment),
}

/// Number of months from the contract start through December of `today`'s year.
pub fn default_horizon(start: YearMonth, today: NaiveDate) -> u32 {
    let current = YearMonth::from_date(today);
    let december = current.add_months(12 - current.month() as i32);
    (start.months_until(december) + 1).max(1) as u32
}

/// Month-by-month view of the contract.
///
/// Each period's rent is updated on its first month with the compounded
/// variation of the `period_months` months that precede it. Rows stop after
/// `horizon_months` or after next month, whichever comes first.
pub fn monthly_schedule(
    points: &[VariationPoint],
    request: &RentRequest,
    horizon_months: u32,
    today: NaiveDate,
) -> Result<Vec<ScheduleRow>, IpcError> {
    let by_month = index_points(points);
    let len = request.period_months;
    let current = YearMonth::from_date(today);
    let last_shown = current.add_months(1);

    // `settled` only advances once a period ends with a computed rent.
    let mut settled = round_units(request.base_rent);
    let mut period_rent = settled;
    let mut provisional = false;
    let mut month = request.start_month();
    let mut rows = Vec::new();

    for i in 0..horizon_months {
        if month > last_shown {
            break;
        }
        let period = i / len;
        let offset = i % len;
        let future = month > current;
        let mut adjustment = None;

        if offset == 0 {
            period_rent = settled;
            provisional = false;
            if period > 0 {
                let previous: Vec<YearMonth> = (1..=request.period_len())
                    .map(|back| month.add_months(-back))
                    .collect();
                if let Some(factor) = compounded_factor(&by_month, &previous)? {
                    let overflow = || IpcError::Overflow { month };
                    let updated = settled.checked_mul(factor).map(round_units).ok_or_else(overflow)?;
                    let amount = updated.checked_sub(settled).ok_or_else(overflow)?;
                    adjustment = Some(RentAdjustment {
                        month,
                        label: format!("Ajuste {}", month.label_es()),
                        amount,
                        future,
                        period,
                    });
                    period_rent = updated;
                } else {
                    provisional = true;
                }
            }
        }

        rows.push(ScheduleRow::Month(RentMonth {
            month,
            label: month.label_es(),
            rent: period_rent,
            ipc_mensual: by_month.get(&month).copied(),
            provisional: provisional && !future,
            future,
            period,
            offset,
        }));
        rows.extend(adjustment.map(ScheduleRow::Adjustment));

        if offset == len - 1 && !provisional {
            settled = period_rent;
        }
        month = month.add_months(1);
    }

    Ok(rows)
}

fn index_points(points: &[VariationPoint]) -> HashMap<YearMonth, Decimal> {
    points.iter().map(|p| (p.month, p.ipc_mensual)).collect()
}

/// Product of `1 + pct/100` over `months`, `None` when any month is missing.
fn compounded_factor(
    by_month: &HashMap<YearMonth, Decimal>,
    months: &[YearMonth],
) -> Result<Option<Decimal>, IpcError> {
    let mut factor = Decimal::ONE;
    for &month in months {
        let Some(pct) = by_month.get(&month) else {
            return Ok(None);
        };
        factor = pct
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|rate| rate.checked_add(Decimal::ONE))
            .and_then(|growth| factor.checked_mul(growth))
            .ok_or(IpcError::Overflow { month })?;
    }
    Ok(Some(factor))
}
