//! Audacity labels output format writer.

use crate::error::Result;
use crate::matcher::SegmentKind;
use crate::output::{OutputWriter, SegmentRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Audacity labels output writer.
///
/// Only discarded segments are labeled; importing the file over the
/// original track marks every cut.
pub struct AudacityWriter {
    writer: BufWriter<File>,
}

impl AudacityWriter {
    /// Create a new Audacity writer.
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl OutputWriter for AudacityWriter {
    fn write_header(&mut self) -> Result<()> {
        // Audacity format has no header
        Ok(())
    }

    fn write_segment(&mut self, segment: &SegmentRecord) -> Result<()> {
        if segment.kind != SegmentKind::Discarded {
            return Ok(());
        }

        writeln!(
            self.writer,
            "{:.6}\t{:.6}\tdiscard {:03}",
            segment.start_time, segment.end_time, segment.index,
        )?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
