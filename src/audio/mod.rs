//! Audio decoding and clip preparation.

mod decode;
mod trim;

pub use decode::{DecodedAudio, decode_audio_file};
pub use trim::audible_bounds;
