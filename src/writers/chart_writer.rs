use crate::analyzers::DashboardData;
use crate::error::Result;
use crate::models::DateRange;
use crate::utils::constants::{
    CHART_PM25_BY_TEMPERATURE, CHART_PM25_YEARLY_TREND, CHART_POLLUTANTS_BY_MONTH,
    CHART_POLLUTANTS_BY_WIND, DASHBOARD_INDEX_FILE,
};
use crate::writers::figures::{self, Figure};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DASHBOARD_TITLE: &str = "Air Quality Dashboard";
pub const DASHBOARD_SUBTITLE: &str = "Effect of Weather on Air Pollution & Air Quality Trends";

/// Fixed findings shown beneath the charts
pub const CONCLUSIONS: [&str; 3] = [
    "PM2.5 and PM10 concentrations are higher at low temperatures.",
    "High wind speeds help disperse pollution.",
    "The PM2.5 trend fluctuates from year to year.",
];

#[derive(Debug, Clone, Serialize)]
pub struct ChartEntry {
    pub title: String,
    pub file: String,
}

/// Top-level document tying the chart files together.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardIndex {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub date_bounds: DateRange,
    pub selection: DateRange,
    pub record_count: usize,
    pub charts: Vec<ChartEntry>,
    pub conclusions: Vec<&'static str>,
}

pub struct ChartWriter {
    output_dir: PathBuf,
    pretty: bool,
}

impl ChartWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The four chart figures, paired with their output file names
    pub fn build_figures(data: &DashboardData) -> Vec<(&'static str, Figure)> {
        vec![
            (
                CHART_PM25_BY_TEMPERATURE,
                figures::pm25_by_temperature(&data.temperature_distribution),
            ),
            (
                CHART_POLLUTANTS_BY_WIND,
                figures::pollutants_by_wind(&data.wind_means),
            ),
            (
                CHART_PM25_YEARLY_TREND,
                figures::pm25_yearly_trend(&data.yearly_trend),
            ),
            (
                CHART_POLLUTANTS_BY_MONTH,
                figures::pollutants_by_month(&data.monthly_means),
            ),
        ]
    }

    /// Write every chart and the dashboard index; returns the written paths
    pub fn write_dashboard(&self, data: &DashboardData) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::new();
        let mut charts = Vec::new();

        for (file_name, figure) in Self::build_figures(data) {
            let path = self.output_dir.join(file_name);
            self.write_json(&path, &figure)?;
            debug!(path = %path.display(), traces = figure.data.len(), "Chart written");

            charts.push(ChartEntry {
                title: figure.layout.title.text.clone(),
                file: file_name.to_string(),
            });
            written.push(path);
        }

        let index = DashboardIndex {
            title: DASHBOARD_TITLE,
            subtitle: DASHBOARD_SUBTITLE,
            date_bounds: data.bounds,
            selection: data.selection,
            record_count: data.record_count,
            charts,
            conclusions: CONCLUSIONS.to_vec(),
        };
        let index_path = self.output_dir.join(DASHBOARD_INDEX_FILE);
        self.write_json(&index_path, &index)?;
        written.push(index_path);

        info!(
            dir = %self.output_dir.display(),
            files = written.len(),
            "Dashboard written"
        );
        Ok(written)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Human-readable rendering of the aggregates, for terminal output
pub fn render_text(data: &DashboardData) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== {} ===\n{}\nSelected: {} to {} ({} records)\n",
        DASHBOARD_TITLE,
        DASHBOARD_SUBTITLE,
        data.selection.start,
        data.selection.end,
        data.record_count
    ));

    out.push_str("\nPM2.5 by Temperature Category:\n");
    for b in &data.temperature_distribution {
        out.push_str(&format!(
            "  {:<20} n={:<6} median={:.1} IQR={:.1} [{:.1}, {:.1}] outliers={}\n",
            b.category,
            b.count,
            b.median,
            b.iqr(),
            b.q1,
            b.q3,
            b.outliers.len()
        ));
    }

    out.push_str("\nMean Pollutants by Wind Speed:\n");
    for m in &data.wind_means {
        out.push_str(&format!(
            "  {:<20} n={:<6} PM2.5={:.1} PM10={:.1}\n",
            m.category, m.count, m.pm25_mean, m.pm10_mean
        ));
    }

    out.push_str("\nMean PM2.5 per Year:\n");
    for y in &data.yearly_trend {
        out.push_str(&format!("  {}  {:.1}\n", y.year, y.pm25_mean));
    }

    out.push_str("\nMean Pollutants per Month:\n");
    for m in &data.monthly_means {
        out.push_str(&format!(
            "  {:>2}  PM2.5={:.1} PM10={:.1}\n",
            m.month, m.pm25_mean, m.pm10_mean
        ));
    }

    out.push_str("\nConclusions:\n");
    for conclusion in CONCLUSIONS {
        out.push_str(&format!("  - {}\n", conclusion));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{BoxStatistics, CategoryMeans, MonthlyMeans, YearlyMean};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn data() -> DashboardData {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2013, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2013, 3, 2).unwrap(),
        )
        .unwrap();

        DashboardData {
            bounds: range,
            selection: range,
            record_count: 2,
            temperature_distribution: vec![BoxStatistics {
                category: "(-5.035, 2.0]".to_string(),
                bin: 0,
                count: 5,
                min: 1.0,
                q1: 2.0,
                median: 3.0,
                q3: 4.0,
                max: 500.0,
                lower_fence: 1.0,
                upper_fence: 4.0,
                outliers: vec![500.0],
            }],
            wind_means: vec![CategoryMeans {
                category: "(0.992, 2.6]".to_string(),
                bin: 0,
                count: 2,
                pm25_mean: 30.0,
                pm10_mean: 50.0,
            }],
            yearly_trend: vec![YearlyMean {
                year: 2013,
                count: 2,
                pm25_mean: 30.0,
            }],
            monthly_means: vec![MonthlyMeans {
                month: 3,
                count: 2,
                pm25_mean: 30.0,
                pm10_mean: 50.0,
            }],
        }
    }

    #[test]
    fn test_write_dashboard_creates_all_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output_dir = temp_dir.path().join("charts");

        let written = ChartWriter::new(&output_dir).write_dashboard(&data())?;

        assert_eq!(written.len(), 5);
        for path in &written {
            assert!(path.exists(), "{} missing", path.display());
        }

        let index: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output_dir.join(DASHBOARD_INDEX_FILE))?)?;
        assert_eq!(index["conclusions"], json!(CONCLUSIONS));
        assert_eq!(
            index["charts"],
            json!([
                {"title": "PM2.5 Distribution by Temperature", "file": CHART_PM25_BY_TEMPERATURE},
                {"title": "Mean PM2.5 & PM10 by Wind Speed", "file": CHART_POLLUTANTS_BY_WIND},
                {"title": "Mean PM2.5 Trend per Year", "file": CHART_PM25_YEARLY_TREND},
                {"title": "Mean PM2.5 and PM10 per Month", "file": CHART_POLLUTANTS_BY_MONTH},
            ])
        );
        assert_eq!(index["date_bounds"]["start"], json!("2013-03-01"));

        Ok(())
    }

    #[test]
    fn test_compact_output() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let writer = ChartWriter::new(temp_dir.path()).with_pretty(false);
        writer.write_dashboard(&data())?;

        let content = fs::read_to_string(temp_dir.path().join(CHART_PM25_YEARLY_TREND))?;
        assert_eq!(content.lines().count(), 1);

        Ok(())
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&data());

        assert!(text.contains("Selected: 2013-03-01 to 2013-03-02 (2 records)"));
        assert!(text.contains("(0.992, 2.6]"));
        assert!(text.contains("median=3.0 IQR=2.0 [2.0, 4.0] outliers=1"));
        assert!(text.contains("High wind speeds help disperse pollution."));
    }
}
