use crate::error::{DashboardError, DataLoadError, Result};
use crate::models::{AirQualityRecord, DateRange, PreparedDataset};
use crate::utils::constants::WHISKER_IQR_FACTOR;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Running arithmetic mean with compensated summation
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    compensation: f64,
    count: usize,
}

impl MeanAccumulator {
    fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMeans {
    pub category: String,
    pub bin: usize,
    pub count: usize,
    pub pm25_mean: f64,
    pub pm10_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyMean {
    pub year: i32,
    pub count: usize,
    pub pm25_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMeans {
    pub month: u32,
    pub count: usize,
    pub pm25_mean: f64,
    pub pm10_mean: f64,
}

/// Five-number summary plus whisker fences for one box of a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStatistics {
    pub category: String,
    pub bin: usize,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Values beyond the whisker limits, ascending
    pub outliers: Vec<f64>,
}

impl BoxStatistics {
    fn from_values(category: String, bin: usize, mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        values.sort_by(f64::total_cmp);
        let q1 = quantile(&values, 0.25);
        let median = quantile(&values, 0.5);
        let q3 = quantile(&values, 0.75);
        let reach = WHISKER_IQR_FACTOR * (q3 - q1);
        let (low_limit, high_limit) = (q1 - reach, q3 + reach);

        // Whiskers end at the most extreme points still inside the limits.
        let lower_fence = values
            .iter()
            .copied()
            .find(|&v| v >= low_limit)
            .unwrap_or(q1);
        let upper_fence = values
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_limit)
            .unwrap_or(q3);
        let outliers = values
            .iter()
            .copied()
            .filter(|&v| v < low_limit || v > high_limit)
            .collect();

        Some(Self {
            category,
            bin,
            count: values.len(),
            min: values[0],
            q1,
            median,
            q3,
            max: values[values.len() - 1],
            lower_fence,
            upper_fence,
            outliers,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Linearly interpolated quantile of sorted, non-empty `values`
fn quantile(values: &[f64], p: f64) -> f64 {
    let position = p * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    values[lower] + (values[upper] - values[lower]) * fraction
}

/// Everything the four charts need, for one selected date range.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub bounds: DateRange,
    pub selection: DateRange,
    pub record_count: usize,
    pub temperature_distribution: Vec<BoxStatistics>,
    pub wind_means: Vec<CategoryMeans>,
    pub yearly_trend: Vec<YearlyMean>,
    pub monthly_means: Vec<MonthlyMeans>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ValueRange {
    fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut acc = MeanAccumulator::default();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values {
            acc.add(value);
            min = min.min(value);
            max = max.max(value);
        }

        (acc.count > 0).then(|| Self {
            min,
            max,
            mean: acc.mean(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStatistics {
    pub total_rows: usize,
    pub records: usize,
    pub dropped_incomplete: usize,
    pub date_range: DateRange,
    pub temperature: ValueRange,
    pub wind_speed: ValueRange,
    pub pm25: ValueRange,
    pub pm10: ValueRange,
    pub temperature_categories: Vec<String>,
    pub wind_categories: Vec<String>,
}

impl DashboardStatistics {
    pub fn summary(&self) -> String {
        format!(
            "Parameters: PM2.5, PM10, Temperature, Wind speed\n\
            Date Range: {} to {} ({} days)\n\
            Records: {} of {} rows ({} incomplete rows dropped)\n\
            Temperature: {:.1}°C to {:.1}°C (mean {:.1}°C)\n\
            Wind Speed: {:.1} m/s to {:.1} m/s (mean {:.1} m/s)\n\
            PM2.5: {:.1} to {:.1} µg/m³ (mean {:.1})\n\
            PM10: {:.1} to {:.1} µg/m³ (mean {:.1})",
            self.date_range.start,
            self.date_range.end,
            self.date_range.num_days(),
            self.records,
            self.total_rows,
            self.dropped_incomplete,
            self.temperature.min,
            self.temperature.max,
            self.temperature.mean,
            self.wind_speed.min,
            self.wind_speed.max,
            self.wind_speed.mean,
            self.pm25.min,
            self.pm25.max,
            self.pm25.mean,
            self.pm10.min,
            self.pm10.max,
            self.pm10.mean,
        )
    }

    pub fn detailed_summary(&self) -> String {
        format!(
            "{}\n\n\
            Temperature Categories:\n{}\n\n\
            Wind Speed Categories:\n{}",
            self.summary(),
            list_categories(&self.temperature_categories),
            list_categories(&self.wind_categories),
        )
    }
}

fn list_categories(labels: &[String]) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("  {}. {}", i + 1, label))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct AirQualityAnalyzer;

impl AirQualityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate the records within `range` (the whole table when `None`).
    ///
    /// The range is clamped to the table's own date bounds first.
    pub fn analyze(
        &self,
        dataset: &PreparedDataset,
        range: Option<DateRange>,
    ) -> Result<DashboardData> {
        let bounds = dataset
            .date_bounds()
            .ok_or(DashboardError::Load(DataLoadError::EmptyDataset {
                dropped: dataset.report().dropped_incomplete,
            }))?;

        let selection = match range {
            Some(range) => range.clamp_to(bounds).map_err(|_| DashboardError::EmptySelection {
                start: range.start,
                end: range.end,
            })?,
            None => bounds,
        };

        let records = dataset.select(&selection);
        if records.is_empty() {
            return Err(DashboardError::EmptySelection {
                start: selection.start,
                end: selection.end,
            });
        }

        debug!(
            records = records.len(),
            start = %selection.start,
            end = %selection.end,
            "Aggregating selected records"
        );

        Ok(DashboardData {
            bounds,
            selection,
            record_count: records.len(),
            temperature_distribution: self
                .pm25_distribution_by_temperature(records.iter().copied()),
            wind_means: self.mean_by_wind_category(records.iter().copied()),
            yearly_trend: self.yearly_pm25_trend(records.iter().copied()),
            monthly_means: self.monthly_pollutant_means(records.iter().copied()),
        })
    }

    /// Mean PM2.5 and PM10 per wind speed category, in category order
    pub fn mean_by_wind_category<'a, I>(&self, records: I) -> Vec<CategoryMeans>
    where
        I: IntoIterator<Item = &'a AirQualityRecord>,
    {
        let mut groups: BTreeMap<usize, (&'a str, MeanAccumulator, MeanAccumulator)> =
            BTreeMap::new();

        for record in records {
            let entry = groups.entry(record.wind_bin).or_insert((
                record.wind_category.as_str(),
                MeanAccumulator::default(),
                MeanAccumulator::default(),
            ));
            entry.1.add(record.pm25);
            entry.2.add(record.pm10);
        }

        groups
            .into_iter()
            .map(|(bin, (category, pm25, pm10))| CategoryMeans {
                category: category.to_string(),
                bin,
                count: pm25.count,
                pm25_mean: pm25.mean(),
                pm10_mean: pm10.mean(),
            })
            .collect()
    }

    /// Mean PM2.5 per calendar year, in year order
    pub fn yearly_pm25_trend<'a, I>(&self, records: I) -> Vec<YearlyMean>
    where
        I: IntoIterator<Item = &'a AirQualityRecord>,
    {
        let mut groups: BTreeMap<i32, MeanAccumulator> = BTreeMap::new();
        for record in records {
            groups.entry(record.year).or_default().add(record.pm25);
        }

        groups
            .into_iter()
            .map(|(year, pm25)| YearlyMean {
                year,
                count: pm25.count,
                pm25_mean: pm25.mean(),
            })
            .collect()
    }

    /// Mean PM2.5 and PM10 per calendar month (1-12), in month order
    pub fn monthly_pollutant_means<'a, I>(&self, records: I) -> Vec<MonthlyMeans>
    where
        I: IntoIterator<Item = &'a AirQualityRecord>,
    {
        let mut groups: BTreeMap<u32, (MeanAccumulator, MeanAccumulator)> = BTreeMap::new();
        for record in records {
            let entry = groups.entry(record.month).or_default();
            entry.0.add(record.pm25);
            entry.1.add(record.pm10);
        }

        groups
            .into_iter()
            .map(|(month, (pm25, pm10))| MonthlyMeans {
                month,
                count: pm25.count,
                pm25_mean: pm25.mean(),
                pm10_mean: pm10.mean(),
            })
            .collect()
    }

    /// PM2.5 box statistics per temperature category, in category order
    pub fn pm25_distribution_by_temperature<'a, I>(&self, records: I) -> Vec<BoxStatistics>
    where
        I: IntoIterator<Item = &'a AirQualityRecord>,
    {
        let mut groups: BTreeMap<usize, (&'a str, Vec<f64>)> = BTreeMap::new();
        for record in records {
            groups
                .entry(record.temp_bin)
                .or_insert((record.temp_category.as_str(), Vec::new()))
                .1
                .push(record.pm25);
        }

        groups
            .into_iter()
            .filter_map(|(bin, (category, values))| {
                BoxStatistics::from_values(category.to_string(), bin, values)
            })
            .collect()
    }

    pub fn summarize(&self, dataset: &PreparedDataset) -> Result<DashboardStatistics> {
        let empty = || {
            DashboardError::Load(DataLoadError::EmptyDataset {
                dropped: dataset.report().dropped_incomplete,
            })
        };

        let records = dataset.records();
        let date_range = dataset.date_bounds().ok_or_else(empty)?;
        let temperature =
            ValueRange::from_values(records.iter().map(|r| r.temperature)).ok_or_else(empty)?;
        let wind_speed =
            ValueRange::from_values(records.iter().map(|r| r.wind_speed)).ok_or_else(empty)?;
        let pm25 = ValueRange::from_values(records.iter().map(|r| r.pm25)).ok_or_else(empty)?;
        let pm10 = ValueRange::from_values(records.iter().map(|r| r.pm10)).ok_or_else(empty)?;

        Ok(DashboardStatistics {
            total_rows: dataset.report().total_rows,
            records: records.len(),
            dropped_incomplete: dataset.report().dropped_incomplete,
            date_range,
            temperature,
            wind_speed,
            pm25,
            pm10,
            temperature_categories: dataset.temp_bins().labels().to_vec(),
            wind_categories: dataset.wind_bins().labels().to_vec(),
        })
    }
}

impl Default for AirQualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
