use crate::error::{DataLoadError, LoadResult};
use crate::models::{
    AirQualityRecord, BinSpec, PreparationReport, PreparedDataset, RawRow, RawTable,
};
use crate::processors::completeness::{AllColumnsPresent, CompletenessPredicate};
use crate::utils::constants::{
    COL_DAY, COL_HOUR, COL_MONTH, COL_PM10, COL_PM25, COL_TEMP, COL_WSPM, COL_YEAR,
    DEFAULT_BIN_COUNT, REQUIRED_COLUMNS,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Positions of the required columns within the header
struct ColumnIndex {
    year: usize,
    month: usize,
    day: usize,
    hour: usize,
    temp: usize,
    wind: usize,
    pm25: usize,
    pm10: usize,
    passthrough: Vec<(usize, String)>,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> LoadResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataLoadError::MissingColumn(name.to_string()))
        };

        let passthrough = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !REQUIRED_COLUMNS.contains(&h.as_str()))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        Ok(Self {
            year: find(COL_YEAR)?,
            month: find(COL_MONTH)?,
            day: find(COL_DAY)?,
            hour: find(COL_HOUR)?,
            temp: find(COL_TEMP)?,
            wind: find(COL_WSPM)?,
            pm25: find(COL_PM25)?,
            pm10: find(COL_PM10)?,
            passthrough,
        })
    }

    fn required(&self) -> [usize; 8] {
        [
            self.year, self.month, self.day, self.hour, self.temp, self.wind, self.pm25,
            self.pm10,
        ]
    }
}

/// A typed row with its timestamp, waiting for category assignment
struct Observation {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    datetime: NaiveDateTime,
    temperature: f64,
    wind_speed: f64,
    pm25: f64,
    pm10: f64,
    extra: BTreeMap<String, String>,
}

/// Turns raw rows into the prepared, categorised table.
pub struct DatasetPreparer {
    temp_bin_count: usize,
    wind_bin_count: usize,
    completeness: Box<dyn CompletenessPredicate>,
}

impl DatasetPreparer {
    pub fn new() -> Self {
        Self {
            temp_bin_count: DEFAULT_BIN_COUNT,
            wind_bin_count: DEFAULT_BIN_COUNT,
            completeness: Box::new(AllColumnsPresent),
        }
    }

    pub fn with_bin_counts(mut self, temp_bins: usize, wind_bins: usize) -> Self {
        self.temp_bin_count = temp_bins;
        self.wind_bin_count = wind_bins;
        self
    }

    pub fn with_completeness<P>(mut self, predicate: P) -> Self
    where
        P: CompletenessPredicate + 'static,
    {
        self.completeness = Box::new(predicate);
        self
    }

    pub fn with_boxed_completeness(mut self, predicate: Box<dyn CompletenessPredicate>) -> Self {
        self.completeness = predicate;
        self
    }

    /// Drop incomplete rows, derive timestamps and dates, and fit both
    /// category binnings on what remains.
    pub fn prepare(&self, raw: &RawTable) -> LoadResult<PreparedDataset> {
        let (observations, report) = self.collect_observations(raw)?;

        let temps: Vec<f64> = observations.iter().map(|o| o.temperature).collect();
        let winds: Vec<f64> = observations.iter().map(|o| o.wind_speed).collect();
        let temp_bins = BinSpec::fit(COL_TEMP, &temps, self.temp_bin_count)?;
        let wind_bins = BinSpec::fit(COL_WSPM, &winds, self.wind_bin_count)?;

        debug!(labels = ?temp_bins.labels(), "Temperature categories");
        debug!(labels = ?wind_bins.labels(), "Wind speed categories");

        self.finish(raw, observations, temp_bins, wind_bins, report)
    }

    /// Same as [`prepare`](Self::prepare) but reuses previously fitted bins,
    /// so categories keep their meaning across subsets.
    pub fn prepare_with_bins(
        &self,
        raw: &RawTable,
        temp_bins: &BinSpec,
        wind_bins: &BinSpec,
    ) -> LoadResult<PreparedDataset> {
        let (observations, report) = self.collect_observations(raw)?;
        self.finish(raw, observations, temp_bins.clone(), wind_bins.clone(), report)
    }

    fn collect_observations(
        &self,
        raw: &RawTable,
    ) -> LoadResult<(Vec<Observation>, PreparationReport)> {
        let columns = ColumnIndex::resolve(&raw.headers)?;
        let mut observations = Vec::with_capacity(raw.len());
        let mut dropped = 0;

        for row in &raw.rows {
            // The record cannot be built without its required fields,
            // whatever the configured predicate says.
            let has_required = columns.required().iter().all(|&i| row.get(i).is_some());
            if !has_required || !self.completeness.is_complete(&raw.headers, row) {
                dropped += 1;
                continue;
            }

            observations.push(self.parse_observation(row, &raw.headers, &columns)?);
        }

        let report = PreparationReport {
            total_rows: raw.len(),
            dropped_incomplete: dropped,
            retained: observations.len(),
        };

        if observations.is_empty() {
            return Err(DataLoadError::EmptyDataset { dropped });
        }

        Ok((observations, report))
    }

    fn parse_observation(
        &self,
        row: &RawRow,
        headers: &[String],
        columns: &ColumnIndex,
    ) -> LoadResult<Observation> {
        let year = parse_integer(row, headers, columns.year)?;
        let month = parse_integer(row, headers, columns.month)?;
        let day = parse_integer(row, headers, columns.day)?;
        let hour = parse_integer(row, headers, columns.hour)?;

        let datetime = build_datetime(year, month, day, hour).ok_or(
            DataLoadError::InvalidTimestamp {
                line: row.line,
                year,
                month,
                day,
                hour,
            },
        )?;

        let extra = columns
            .passthrough
            .iter()
            .filter_map(|(i, name)| row.get(*i).map(|v| (name.clone(), v.to_string())))
            .collect();

        Ok(Observation {
            year: year as i32,
            month: month as u32,
            day: day as u32,
            hour: hour as u32,
            datetime,
            temperature: parse_float(row, headers, columns.temp)?,
            wind_speed: parse_float(row, headers, columns.wind)?,
            pm25: parse_float(row, headers, columns.pm25)?,
            pm10: parse_float(row, headers, columns.pm10)?,
            extra,
        })
    }

    fn finish(
        &self,
        raw: &RawTable,
        observations: Vec<Observation>,
        temp_bins: BinSpec,
        wind_bins: BinSpec,
        report: PreparationReport,
    ) -> LoadResult<PreparedDataset> {
        let records = observations
            .into_iter()
            .map(|o| -> LoadResult<AirQualityRecord> {
                let (temp_bin, temp_category) = temp_bins.categorize(o.temperature)?;
                let (wind_bin, wind_category) = wind_bins.categorize(o.wind_speed)?;

                Ok(AirQualityRecord {
                    year: o.year,
                    month: o.month,
                    day: o.day,
                    hour: o.hour,
                    temperature: o.temperature,
                    wind_speed: o.wind_speed,
                    pm25: o.pm25,
                    pm10: o.pm10,
                    extra: o.extra,
                    date: o.datetime.date(),
                    datetime: o.datetime,
                    temp_category: temp_category.to_string(),
                    temp_bin,
                    wind_category: wind_category.to_string(),
                    wind_bin,
                })
            })
            .collect::<LoadResult<Vec<_>>>()?;

        info!(
            retained = report.retained,
            dropped = report.dropped_incomplete,
            "Prepared air-quality records"
        );

        Ok(PreparedDataset::new(
            records,
            raw.headers.clone(),
            temp_bins,
            wind_bins,
            report,
        ))
    }
}

impl Default for DatasetPreparer {
    fn default() -> Self {
        Self::new()
    }
}

fn build_datetime(year: i64, month: i64, day: i64, hour: i64) -> Option<NaiveDateTime> {
    let year = i32::try_from(year).ok()?;
    let month = u32::try_from(month).ok()?;
    let day = u32::try_from(day).ok()?;
    let hour = u32::try_from(hour).ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, 0, 0)
}

fn invalid_number(row: &RawRow, headers: &[String], index: usize) -> DataLoadError {
    DataLoadError::InvalidNumber {
        line: row.line,
        column: headers.get(index).cloned().unwrap_or_default(),
        value: row.get(index).unwrap_or_default().to_string(),
    }
}

/// Integer field; integral floats such as `"3.0"` are accepted.
fn parse_integer(row: &RawRow, headers: &[String], index: usize) -> LoadResult<i64> {
    let text = row
        .get(index)
        .ok_or_else(|| invalid_number(row, headers, index))?;

    if let Ok(value) = text.parse::<i64>() {
        return Ok(value);
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
        _ => Err(invalid_number(row, headers, index)),
    }
}

fn parse_float(row: &RawRow, headers: &[String], index: usize) -> LoadResult<f64> {
    row.get(index)
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .ok_or_else(|| invalid_number(row, headers, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::completeness::RequiredColumnsPresent;
    use crate::readers::AirQualityReader;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "No,year,month,day,hour,PM2.5,PM10,SO2,TEMP,WSPM,wd,station";

    fn table(rows: &[&str]) -> RawTable {
        let content = format!("{}\n{}\n", HEADER, rows.join("\n"));
        AirQualityReader::new().parse_str(&content).unwrap()
    }

    #[test]
    fn test_two_row_example() {
        let raw = table(&[
            "1,2013,3,1,0,50,80,4,-5,1,N,Aotizhongxin",
            "2,2013,3,1,0,10,20,4,30,9,N,Aotizhongxin",
        ]);

        let dataset = DatasetPreparer::new().prepare(&raw).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.temp_bins().bin_count(), 5);
        assert_eq!(dataset.temp_bins().upper_bound(), 30.0);
        assert!(dataset.temp_bins().lower_bound() < -5.0);

        let records = dataset.records();
        assert_eq!(records[0].temp_bin, 0);
        assert_eq!(records[0].temp_category, dataset.temp_bins().labels()[0]);
        assert_eq!(records[1].temp_bin, 4);
        assert_eq!(records[1].temp_category, dataset.temp_bins().labels()[4]);
        assert_eq!(records[0].wind_bin, 0);
        assert_eq!(records[1].wind_bin, 4);
    }

    #[test]
    fn test_derived_timestamp_and_date() {
        let raw = table(&["1,2014,12,31,23,50,80,4,-5,1,NW,Dongsi"]);

        let dataset = DatasetPreparer::new().prepare(&raw).unwrap();
        let record = &dataset.records()[0];

        assert_eq!(
            record.datetime,
            NaiveDate::from_ymd_opt(2014, 12, 31)
                .unwrap()
                .and_hms_opt(23, 0, 0)
                .unwrap()
        );
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2014, 12, 31).unwrap());
        assert_eq!(record.extra_value("wd"), Some("NW"));
        assert_eq!(record.extra_value("station"), Some("Dongsi"));
        assert_eq!(record.extra_value("No"), Some("1"));
        assert_eq!(record.extra_value("TEMP"), None);
    }

    #[test]
    fn test_missing_pm25_row_is_dropped() {
        let raw = table(&[
            "1,2013,3,1,0,50,80,4,-5,1,N,Aotizhongxin",
            "2,2013,3,1,1,NA,80,4,0,2,N,Aotizhongxin",
            "3,2013,3,1,2,10,20,4,30,9,N,Aotizhongxin",
        ]);

        let dataset = DatasetPreparer::new().prepare(&raw).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.report().dropped_incomplete, 1);
        assert_eq!(dataset.report().total_rows, 3);
        assert!(dataset.records().iter().all(|r| r.hour != 1));
    }

    #[test]
    fn test_any_missing_column_drops_row_by_default() {
        let raw = table(&[
            "1,2013,3,1,0,50,80,,-5,1,N,Aotizhongxin",
            "2,2013,3,1,1,20,30,4,0,2,N,Aotizhongxin",
            "3,2013,3,1,2,10,20,4,30,9,,Aotizhongxin",
        ]);

        let dataset = DatasetPreparer::new().prepare(&raw).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.report().dropped_incomplete, 2);

        let selective = DatasetPreparer::new()
            .with_completeness(RequiredColumnsPresent::default())
            .prepare(&raw)
            .unwrap();
        assert_eq!(selective.len(), 3);
        assert_eq!(selective.report().dropped_incomplete, 0);
        assert_eq!(selective.records()[2].extra_value("wd"), None);
    }

    #[test]
    fn test_bins_computed_after_filtering() {
        let raw = table(&[
            "1,2013,3,1,0,50,80,4,-5,1,N,Aotizhongxin",
            "2,2013,3,1,1,NA,80,4,100,20,N,Aotizhongxin",
            "3,2013,3,1,2,10,20,4,30,9,N,Aotizhongxin",
        ]);

        let dataset = DatasetPreparer::new().prepare(&raw).unwrap();

        assert_eq!(dataset.temp_bins().upper_bound(), 30.0);
        assert_eq!(dataset.wind_bins().upper_bound(), 9.0);
    }

    #[test]
    fn test_invalid_month_fails_load() {
        let raw = table(&["1,2013,13,1,0,50,80,4,-5,1,N,Aotizhongxin"]);

        match DatasetPreparer::new().prepare(&raw) {
            Err(DataLoadError::InvalidTimestamp { line, month, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(month, 13);
            }
            other => panic!("unexpected result: {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn test_invalid_day_and_hour_fail_load() {
        for row in [
            "1,2013,2,30,0,50,80,4,-5,1,N,Aotizhongxin",
            "1,2013,2,1,24,50,80,4,-5,1,N,Aotizhongxin",
            "1,2013,2,1,-1,50,80,4,-5,1,N,Aotizhongxin",
        ] {
            assert!(matches!(
                DatasetPreparer::new().prepare(&table(&[row])),
                Err(DataLoadError::InvalidTimestamp { .. })
            ));
        }
    }

    #[test]
    fn test_unparseable_number_fails_load() {
        let raw = table(&["1,2013,3,1,0,50,80,4,warm,1,N,Aotizhongxin"]);

        match DatasetPreparer::new().prepare(&raw) {
            Err(DataLoadError::InvalidNumber { column, value, .. }) => {
                assert_eq!(column, "TEMP");
                assert_eq!(value, "warm");
            }
            other => panic!("unexpected result: {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn test_integral_float_components_accepted() {
        let raw = table(&["1,2013.0,3.0,1,0,50,80,4,-5,1,N,Aotizhongxin"]);

        let dataset = DatasetPreparer::new().prepare(&raw).unwrap();
        assert_eq!(dataset.records()[0].year, 2013);
        assert_eq!(dataset.records()[0].month, 3);

        let fractional = table(&["1,2013,3.5,1,0,50,80,4,-5,1,N,Aotizhongxin"]);
        assert!(matches!(
            DatasetPreparer::new().prepare(&fractional),
            Err(DataLoadError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_all_rows_incomplete_is_an_error() {
        let raw = table(&["1,2013,3,1,0,NA,80,4,-5,1,N,Aotizhongxin"]);

        assert!(matches!(
            DatasetPreparer::new().prepare(&raw),
            Err(DataLoadError::EmptyDataset { dropped: 1 })
        ));
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let raw = table(&[
            "1,2013,3,1,0,50,80,4,-3.7,1.2,N,Aotizhongxin",
            "2,2013,3,1,1,12,30,4,12.9,4.4,N,Aotizhongxin",
            "3,2013,3,1,2,10,20,4,31.25,0.3,N,Aotizhongxin",
        ]);
        let preparer = DatasetPreparer::new();

        let first = preparer.prepare(&raw).unwrap();
        let second = preparer.prepare(&raw).unwrap();

        assert_eq!(first.temp_bins(), second.temp_bins());
        assert_eq!(first.wind_bins(), second.wind_bins());
        assert_eq!(first.records(), second.records());
    }

    #[test]
    fn test_prepare_with_fixed_bins() {
        let full = table(&[
            "1,2013,3,1,0,50,80,4,-5,1,N,Aotizhongxin",
            "2,2013,3,1,1,20,30,4,10,5,N,Aotizhongxin",
            "3,2013,3,1,2,10,20,4,30,9,N,Aotizhongxin",
        ]);
        let subset = table(&["2,2013,3,1,1,20,30,4,10,5,N,Aotizhongxin"]);
        let preparer = DatasetPreparer::new();
        let dataset = preparer.prepare(&full).unwrap();

        let reused = preparer
            .prepare_with_bins(&subset, dataset.temp_bins(), dataset.wind_bins())
            .unwrap();
        assert_eq!(reused.records()[0].temp_category, dataset.records()[1].temp_category);
        assert_eq!(reused.temp_bins(), dataset.temp_bins());

        let outside = table(&["4,2013,3,1,3,20,30,4,45,5,N,Aotizhongxin"]);
        assert!(matches!(
            preparer.prepare_with_bins(&outside, dataset.temp_bins(), dataset.wind_bins()),
            Err(DataLoadError::OutOfBinRange { .. })
        ));
    }

    #[test]
    fn test_custom_bin_counts() {
        let raw = table(&[
            "1,2013,3,1,0,50,80,4,0,1,N,Aotizhongxin",
            "2,2013,3,1,2,10,20,4,30,9,N,Aotizhongxin",
        ]);

        let dataset = DatasetPreparer::new()
            .with_bin_counts(3, 4)
            .prepare(&raw)
            .unwrap();

        assert_eq!(dataset.temp_bins().bin_count(), 3);
        assert_eq!(dataset.wind_bins().bin_count(), 4);
        assert_eq!(dataset.records()[1].temp_bin, 2);
        assert_eq!(dataset.records()[1].wind_bin, 3);
    }
}
