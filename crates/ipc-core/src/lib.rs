pub mod error;
pub mod month;
pub mod rent;
pub mod rounding;
pub mod series;
pub mod variation;

pub use error::IpcError;
pub use month::YearMonth;
pub use rent::{
    MAX_PERIOD_MONTHS, RentAdjustment, RentMonth, RentPeriod, RentRequest, ScheduleRow,
    default_horizon, generate_rent_table, monthly_schedule,
};
pub use rounding::{round_half_away, round_units, round1};
pub use series::{ColumnLayout, MonthlyRecord, ParsedSeries, SkippedRow, parse_series};
pub use variation::{Resolution, VariationPoint, resolve_variations};

/// Parsed records and their resolved monthly variations.
#[derive(Debug, Default)]
pub struct DerivedSeries {
    pub records: Vec<MonthlyRecord>,
    pub points: Vec<VariationPoint>,
    pub skipped: Vec<SkippedRow>,
    /// Months whose variation could not be computed.
    pub failed: Vec<IpcError>,
}

impl DerivedSeries {
    pub fn last_month(&self) -> Option<YearMonth> {
        self.points.last().map(|p| p.month)
    }

    /// The `n` most recent points, oldest first.
    pub fn latest(&self, n: usize) -> &[VariationPoint] {
        let skip = self.points.len().saturating_sub(n);
        &self.points[skip..]
    }
}

/// Runs the whole derivation pipeline over the raw dataset text.
pub fn derive_series(text: &str) -> Result<DerivedSeries, IpcError> {
    let ParsedSeries { records, skipped } = parse_series(text)?;
    for row in &skipped {
        tracing::debug!(line = row.line, reason = %row.reason, "Skipped IPC dataset row");
    }

    let Resolution { points, errors } = resolve_variations(&records);
    for error in &errors {
        tracing::warn!(error = %error, "Dropped IPC variation point");
    }

    tracing::debug!(
        records = records.len(),
        points = points.len(),
        skipped = skipped.len(),
        "Derived IPC series"
    );

    Ok(DerivedSeries {
        records,
        points,
        skipped,
        failed: errors,
    })
}
