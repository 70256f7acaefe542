pub mod binning;
pub mod dataset;
pub mod record;

pub use binning::BinSpec;
pub use dataset::{DateRange, PreparationReport, PreparedDataset};
pub use record::{AirQualityRecord, RawRow, RawTable};
