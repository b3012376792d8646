use rust_decimal::Decimal;
use serde::Serialize;

use crate::{error::IpcError, month::YearMonth, rounding::ratio_to_percent, series::MonthlyRecord};

/// Monthly variation in percent, one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariationPoint {
    pub month: YearMonth,
    pub ipc_mensual: Decimal,
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub points: Vec<VariationPoint>,
    /// Records whose variation could not be computed; they are absent from `points`.
    pub errors: Vec<IpcError>,
}

/// Resolves the monthly variation of every record.
///
/// The published ratio wins when present. Otherwise the ratio is derived from
/// the index level of the previous record, so the first record only yields a
/// point if it carries its own ratio.
/// NOTE: records must be sorted in chronological order (oldest first)
pub fn resolve_variations(records: &[MonthlyRecord]) -> Resolution {
    debug_assert!(
        records.windows(2).all(|w| w[0].month < w[1].month),
        "Records must be sorted in chronological order"
    );

    let mut resolution = Resolution::default();
    let mut previous: Option<&MonthlyRecord> = None;

    for record in records {
        let ratio = match (record.raw_ratio, previous) {
            (Some(ratio), _) => Some(Ok(ratio)),
            (None, Some(prev)) => Some(computed_ratio(prev, record)),
            (None, None) => None,
        };

        let percent = ratio.map(|ratio| {
            ratio.and_then(|ratio| {
                ratio_to_percent(ratio).ok_or(IpcError::Overflow {
                    month: record.month,
                })
            })
        });
        match percent {
            Some(Ok(ipc_mensual)) => resolution.points.push(VariationPoint {
                month: record.month,
                ipc_mensual,
            }),
            Some(Err(e)) => resolution.errors.push(e),
            None => {}
        }
        previous = Some(record);
    }

    resolution
}

fn computed_ratio(previous: &MonthlyRecord, current: &MonthlyRecord) -> Result<Decimal, IpcError> {
    if previous.index_value.is_zero() {
        return Err(IpcError::DivisionByZero {
            month: current.month,
        });
    }
    current
        .index_value
        .checked_div(previous.index_value)
        .and_then(|quotient| quotient.checked_sub(Decimal::ONE))
        .ok_or(IpcError::Overflow {
            month: current.month,
        })
}
