pub mod air_quality_reader;

pub use air_quality_reader::{is_missing_value, AirQualityReader};
