/// Source column names
pub const COL_YEAR: &str = "year";
pub const COL_MONTH: &str = "month";
pub const COL_DAY: &str = "day";
pub const COL_HOUR: &str = "hour";
pub const COL_TEMP: &str = "TEMP";
pub const COL_WSPM: &str = "WSPM";
pub const COL_PM25: &str = "PM2.5";
pub const COL_PM10: &str = "PM10";

/// Columns every input file must carry
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_YEAR, COL_MONTH, COL_DAY, COL_HOUR, COL_TEMP, COL_WSPM, COL_PM25, COL_PM10,
];

/// Field values read as missing
pub const MISSING_VALUE_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Binning defaults
pub const DEFAULT_BIN_COUNT: usize = 5;
/// Fraction of the value range the lowest edge is pushed down by
pub const BIN_EDGE_ADJUSTMENT: f64 = 0.001;
/// Starting precision of interval labels
pub const LABEL_PRECISION: u32 = 3;

/// File locations
pub const DEFAULT_DATA_PATH: &str = "dashboard/data_all.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Chart output files
pub const CHART_PM25_BY_TEMPERATURE: &str = "pm25_by_temperature.json";
pub const CHART_POLLUTANTS_BY_WIND: &str = "pollutants_by_wind.json";
pub const CHART_PM25_YEARLY_TREND: &str = "pm25_yearly_trend.json";
pub const CHART_POLLUTANTS_BY_MONTH: &str = "pollutants_by_month.json";
pub const DASHBOARD_INDEX_FILE: &str = "dashboard.json";

/// Box plot whisker reach, in interquartile ranges
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Plotly template applied to every figure
pub const CHART_TEMPLATE: &str = "plotly_white";
