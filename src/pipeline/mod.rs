//! Processing pipeline components.

mod coordinator;
mod processor;
mod templates;

pub use coordinator::{
    OutputLayout, ProcessCheck, ProcessOptions, check_output_collisions, collect_input_files,
    is_audio_file, ms_to_samples, output_dir_for, secs_to_samples, should_process,
};
pub use processor::{ProcessResult, process_file};
pub use templates::{load_template, load_templates};
