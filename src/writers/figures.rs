//! Plotly-compatible figure documents for the four dashboard charts.

use serde::Serialize;
use serde_json::Value;

use crate::analyzers::{BoxStatistics, CategoryMeans, MonthlyMeans, YearlyMean};
use crate::utils::constants::CHART_TEMPLATE;

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub x: Vec<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<f64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,

    // Precomputed box statistics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q1: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q3: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowerfence: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upperfence: Option<Vec<f64>>,
}

impl Trace {
    fn bar(name: &str, x: Vec<Value>, y: Vec<f64>) -> Self {
        Self {
            kind: "bar",
            name: name.to_string(),
            x,
            y: Some(y),
            mode: None,
            q1: None,
            median: None,
            q3: None,
            lowerfence: None,
            upperfence: None,
        }
    }

    fn line(name: &str, x: Vec<Value>, y: Vec<f64>) -> Self {
        Self {
            kind: "scatter",
            mode: Some("lines+markers"),
            ..Self::bar(name, x, y)
        }
    }

    fn markers(name: &str, x: Vec<Value>, y: Vec<f64>) -> Self {
        Self {
            kind: "scatter",
            mode: Some("markers"),
            ..Self::bar(name, x, y)
        }
    }

    fn boxed(stats: &BoxStatistics) -> Self {
        Self {
            kind: "box",
            name: stats.category.clone(),
            x: vec![Value::from(stats.category.as_str())],
            y: None,
            mode: None,
            q1: Some(vec![stats.q1]),
            median: Some(vec![stats.median]),
            q3: Some(vec![stats.q3]),
            lowerfence: Some(vec![stats.lower_fence]),
            upperfence: Some(vec![stats.upper_fence]),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<&'static str>,

    pub template: &'static str,
}

impl Layout {
    fn new(title: &str, title_x: f64, x_title: &str, y_title: &str) -> Self {
        Self {
            title: Title {
                text: title.to_string(),
                x: title_x,
                font: Font {
                    size: 18,
                    family: "Arial",
                    color: "black",
                },
            },
            xaxis: Axis::titled(x_title),
            yaxis: Axis::titled(y_title),
            barmode: None,
            template: CHART_TEMPLATE,
        }
    }

    fn grouped(mut self) -> Self {
        self.barmode = Some("group");
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    pub x: f64,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub size: u32,
    pub family: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
}

impl Axis {
    fn titled(text: &str) -> Self {
        Self {
            title: AxisTitle {
                text: text.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisTitle {
    pub text: String,
}

/// One box per temperature category, followed by its outlying readings
pub fn pm25_by_temperature(distribution: &[BoxStatistics]) -> Figure {
    let mut data = Vec::new();
    for stats in distribution {
        data.push(Trace::boxed(stats));
        if !stats.outliers.is_empty() {
            data.push(Trace::markers(
                &stats.category,
                vec![Value::from(stats.category.as_str()); stats.outliers.len()],
                stats.outliers.clone(),
            ));
        }
    }

    Figure {
        data,
        layout: Layout::new(
            "PM2.5 Distribution by Temperature",
            0.3,
            "Temperature Category",
            "PM2.5 Concentration",
        ),
    }
}

pub fn pollutants_by_wind(means: &[CategoryMeans]) -> Figure {
    let x: Vec<Value> = means
        .iter()
        .map(|m| Value::from(m.category.as_str()))
        .collect();

    Figure {
        data: vec![
            Trace::bar("PM2.5", x.clone(), means.iter().map(|m| m.pm25_mean).collect()),
            Trace::bar("PM10", x, means.iter().map(|m| m.pm10_mean).collect()),
        ],
        layout: Layout::new(
            "Mean PM2.5 & PM10 by Wind Speed",
            0.2,
            "Wind Speed",
            "Pollutant Concentration",
        )
        .grouped(),
    }
}

pub fn pm25_yearly_trend(trend: &[YearlyMean]) -> Figure {
    Figure {
        data: vec![Trace::line(
            "PM2.5",
            trend.iter().map(|t| Value::from(t.year)).collect(),
            trend.iter().map(|t| t.pm25_mean).collect(),
        )],
        layout: Layout::new(
            "Mean PM2.5 Trend per Year",
            0.3,
            "Year",
            "PM2.5 Concentration",
        ),
    }
}

pub fn pollutants_by_month(means: &[MonthlyMeans]) -> Figure {
    let x: Vec<Value> = means.iter().map(|m| Value::from(m.month)).collect();

    Figure {
        data: vec![
            Trace::bar("PM2.5", x.clone(), means.iter().map(|m| m.pm25_mean).collect()),
            Trace::bar("PM10", x, means.iter().map(|m| m.pm10_mean).collect()),
        ],
        layout: Layout::new(
            "Mean PM2.5 and PM10 per Month",
            0.3,
            "Month",
            "Pollutant Concentration",
        )
        .grouped(),
    }
}
