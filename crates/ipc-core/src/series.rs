//! Parsing of the published IPC dataset.
//!
//! The dataset is a comma separated file whose first row is a header. Only
//! three columns matter: the period date, the national index level and the
//! optional monthly ratio published alongside it.

use std::{collections::HashSet, str::FromStr};

use csv::StringRecord;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{error::IpcError, month::YearMonth};

/// One month of the index series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRecord {
    pub month: YearMonth,
    pub index_value: Decimal,
    /// Month-over-month proportion (`0.016` for 1.6%) when the dataset provides it.
    pub raw_ratio: Option<Decimal>,
}

/// Column positions of the fields we read, validated against the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub date: usize,
    pub index: usize,
    pub ratio: Option<usize>,
}

impl ColumnLayout {
    pub const DATE_POSITION: usize = 0;
    pub const INDEX_POSITION: usize = 1;
    pub const RATIO_POSITION: usize = 8;

    pub fn from_header(header: &StringRecord) -> Result<Self, IpcError> {
        if header.len() <= Self::DATE_POSITION {
            return Err(IpcError::MissingColumn {
                name: "date",
                position: Self::DATE_POSITION + 1,
            });
        }
        if header.len() <= Self::INDEX_POSITION {
            return Err(IpcError::MissingColumn {
                name: "index",
                position: Self::INDEX_POSITION + 1,
            });
        }
        let ratio = (header.len() > Self::RATIO_POSITION).then_some(Self::RATIO_POSITION);
        Ok(Self {
            date: Self::DATE_POSITION,
            index: Self::INDEX_POSITION,
            ratio,
        })
    }
}

/// A data row that was dropped while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedSeries {
    /// Chronologically ordered, one record per month.
    pub records: Vec<MonthlyRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Parses the raw dataset text.
///
/// Malformed rows never fail the whole parse: they are reported in
/// [`ParsedSeries::skipped`] and left for the caller to log.
pub fn parse_series(text: &str) -> Result<ParsedSeries, IpcError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let header = reader.headers()?.clone();
    if header.is_empty() || header.iter().all(str::is_empty) {
        return Err(IpcError::EmptyDataset);
    }
    let layout = ColumnLayout::from_header(&header)?;

    let mut parsed = ParsedSeries::default();
    let mut seen = HashSet::new();

    for (idx, result) in reader.records().enumerate() {
        // records() starts right after the header, lines are 1-based
        let line = idx + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                parsed.skipped.push(SkippedRow {
                    line,
                    reason: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, layout) {
            Ok(row) => {
                if seen.insert(row.month) {
                    parsed.records.push(row);
                } else {
                    parsed.skipped.push(SkippedRow {
                        line,
                        reason: format!("duplicate month {}", row.month),
                    });
                }
            }
            Err(reason) => parsed.skipped.push(SkippedRow { line, reason }),
        }
    }

    parsed.records.sort_by_key(|r| r.month);
    Ok(parsed)
}

fn parse_row(record: &StringRecord, layout: ColumnLayout) -> Result<MonthlyRecord, String> {
    let date_cell = record.get(layout.date).unwrap_or_default();
    if date_cell.is_empty() {
        return Err("empty date".to_string());
    }
    let month = YearMonth::parse_date_cell(date_cell).map_err(|e| e.to_string())?;

    let index_cell = record.get(layout.index).unwrap_or_default();
    if index_cell.is_empty() {
        return Err(format!("empty index for {month}"));
    }
    let index_value = parse_decimal(index_cell)
        .ok_or_else(|| format!("invalid index '{index_cell}' for {month}"))?;

    let raw_ratio = layout
        .ratio
        .and_then(|pos| record.get(pos))
        .filter(|cell| !cell.is_empty())
        .and_then(parse_decimal);

    Ok(MonthlyRecord {
        month,
        index_value,
        raw_ratio,
    })
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
