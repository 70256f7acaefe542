pub mod analyzers;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use analyzers::{AirQualityAnalyzer, DashboardData};
pub use config::DashboardConfig;
pub use error::{DashboardError, DataLoadError, LoadResult, Result};
pub use models::{AirQualityRecord, BinSpec, DateRange, PreparedDataset};
pub use processors::DatasetPreparer;
pub use readers::AirQualityReader;
pub use writers::ChartWriter;
