use crate::error::{DataLoadError, LoadResult};
use crate::models::{RawRow, RawTable};
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, MISSING_VALUE_MARKERS, REQUIRED_COLUMNS};
use encoding_rs::UTF_8;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

pub struct AirQualityReader {
    use_mmap: bool,
}

impl AirQualityReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Read the comma-separated dataset at `path` into a raw table
    pub fn read(&self, path: &Path) -> LoadResult<RawTable> {
        info!(path = %path.display(), mmap = self.use_mmap, "Reading air-quality dataset");

        let table = if self.use_mmap {
            self.read_mmap(path)?
        } else {
            self.read_buffered(path)?
        };

        info!(
            rows = table.len(),
            columns = table.headers.len(),
            "Dataset read"
        );
        Ok(table)
    }

    fn read_buffered(&self, path: &Path) -> LoadResult<RawTable> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        self.parse_bytes(&bytes)
    }

    /// Memory-mapped read for large files
    fn read_mmap(&self, path: &Path) -> LoadResult<RawTable> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        self.parse_bytes(&mmap)
    }

    /// Decode UTF-8 (dropping a leading BOM) and parse
    pub fn parse_bytes(&self, bytes: &[u8]) -> LoadResult<RawTable> {
        let (content, had_errors) = UTF_8.decode_with_bom_removal(bytes);
        if had_errors {
            return Err(DataLoadError::InvalidFormat(
                "Input is not valid UTF-8".to_string(),
            ));
        }

        self.parse_str(&content)
    }

    pub fn parse_str(&self, content: &str) -> LoadResult<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        for required in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == required) {
                return Err(DataLoadError::MissingColumn(required.to_string()));
            }
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            let values = record.iter().map(parse_field).collect();
            rows.push(RawRow::new(line, values));
        }

        debug!(rows = rows.len(), "Parsed CSV body");
        Ok(RawTable::new(headers, rows))
    }
}

impl Default for AirQualityReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a trimmed field is one of the recognised missing-value markers
pub fn is_missing_value(field: &str) -> bool {
    MISSING_VALUE_MARKERS.contains(&field)
}

fn parse_field(field: &str) -> Option<String> {
    if is_missing_value(field) {
        None
    } else {
        Some(field.to_string())
    }
}
