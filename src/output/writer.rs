//! Output writer trait definition.

use crate::error::Result;
use crate::output::SegmentRecord;

/// Trait for writing segment reports.
pub trait OutputWriter {
    /// Write the file header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write a single segment.
    fn write_segment(&mut self, segment: &SegmentRecord) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()>;
}
