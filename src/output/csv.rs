//! CSV segment table writer.

use crate::error::{Error, Result};
use crate::output::{OutputWriter, SegmentRecord};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Column headers, in write order.
const HEADER: [&str; 6] = ["Index", "Kind", "Start (s)", "End (s)", "Start sample", "End sample"];

/// CSV format output writer.
pub struct CsvWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    decimals: usize,
}

impl CsvWriter {
    /// Create a new CSV writer with times printed to `decimals` places.
    pub fn new(path: &Path, decimals: usize) -> Result<Self> {
        let writer = csv::Writer::from_path(path).map_err(|e| Error::CsvWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            decimals,
        })
    }

    fn map_err(&self, source: csv::Error) -> Error {
        Error::CsvWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl OutputWriter for CsvWriter {
    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(HEADER)
            .map_err(|e| self.map_err(e))
    }

    fn write_segment(&mut self, segment: &SegmentRecord) -> Result<()> {
        let decimals = self.decimals;
        let record = [
            segment.index.to_string(),
            segment.kind.to_string(),
            format!("{:.decimals$}", segment.start_time),
            format!("{:.decimals$}", segment.end_time),
            segment.start_index.to_string(),
            segment.end_index.to_string(),
        ];
        self.writer
            .write_record(&record)
            .map_err(|e| self.map_err(e))
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
