//! Output writers for cleaned audio and segment reports.

mod audacity;
mod csv;
mod json;
pub mod progress;
mod types;
mod wav;
mod writer;

pub use audacity::AudacityWriter;
pub use csv::CsvWriter;
pub use json::{JsonCandidate, JsonReportFile, JsonReportWriter, JsonSettings, JsonSummary};
pub use types::{SegmentRecord, segment_records};
pub use wav::{WavWriter, sanitize_filename, write_wav_file};
pub use writer::OutputWriter;
