use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::models::{AirQualityRecord, BinSpec};

/// Row counts from one preparation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreparationReport {
    pub total_rows: usize,
    pub dropped_incomplete: usize,
    pub retained: usize,
}

impl PreparationReport {
    pub fn retained_percentage(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        100.0 * self.retained as f64 / self.total_rows as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "Rows read: {}\nRows retained: {} ({:.1}%)\nIncomplete rows dropped: {}",
            self.total_rows,
            self.retained,
            self.retained_percentage(),
            self.dropped_incomplete
        )
    }
}

/// Inclusive calendar-date window used to select part of the prepared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Restrict the range to `bounds`, keeping it non-empty.
    pub fn clamp_to(&self, bounds: DateRange) -> Result<Self> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        Self::new(start, end)
    }

    pub fn num_days(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_days() + 1
    }
}

/// The prepared table, read-only once built.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    records: Vec<AirQualityRecord>,
    columns: Vec<String>,
    temp_bins: BinSpec,
    wind_bins: BinSpec,
    report: PreparationReport,
}

impl PreparedDataset {
    pub fn new(
        records: Vec<AirQualityRecord>,
        columns: Vec<String>,
        temp_bins: BinSpec,
        wind_bins: BinSpec,
        report: PreparationReport,
    ) -> Self {
        Self {
            records,
            columns,
            temp_bins,
            wind_bins,
            report,
        }
    }

    pub fn records(&self) -> &[AirQualityRecord] {
        &self.records
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn temp_bins(&self) -> &BinSpec {
        &self.temp_bins
    }

    pub fn wind_bins(&self) -> &BinSpec {
        &self.wind_bins
    }

    pub fn report(&self) -> &PreparationReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest calendar date in the table.
    pub fn date_bounds(&self) -> Option<DateRange> {
        let first = self.records.first()?.date;
        let (start, end) = self
            .records
            .iter()
            .fold((first, first), |(lo, hi), r| (lo.min(r.date), hi.max(r.date)));
        Some(DateRange { start, end })
    }

    /// Borrowed view of the records whose date lies in `range`.
    pub fn select(&self, range: &DateRange) -> Vec<&AirQualityRecord> {
        self.records
            .iter()
            .filter(|r| range.contains(r.date))
            .collect()
    }
}
