use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One data row as read from the source file; `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: u64,
    pub values: Vec<Option<String>>,
}

impl RawRow {
    pub fn new(line: u64, values: Vec<Option<String>>) -> Self {
        Self { line, values }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(Option::is_none)
    }
}

/// Header plus rows of the source file, before any typing or filtering.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A prepared hourly observation with its derived date and category fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityRecord {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,

    #[serde(rename = "TEMP")]
    pub temperature: f64,

    #[serde(rename = "WSPM")]
    pub wind_speed: f64,

    #[serde(rename = "PM2.5")]
    pub pm25: f64,

    #[serde(rename = "PM10")]
    pub pm10: f64,

    /// Remaining source columns, unchanged
    pub extra: BTreeMap<String, String>,

    pub datetime: NaiveDateTime,
    pub date: NaiveDate,

    pub temp_category: String,
    pub temp_bin: usize,

    pub wind_category: String,
    pub wind_bin: usize,
}

impl AirQualityRecord {
    pub fn extra_value(&self, column: &str) -> Option<&str> {
        self.extra.get(column).map(String::as_str)
    }
}
