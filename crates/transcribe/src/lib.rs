//! Reelsmith Transcription
//!
//! Word-level timestamps for narration audio:
//! - **Transcriber:** the seam the batch driver depends on
//! - **Whisper CLI:** local inference through the `whisper` executable
//! - **Whisper JSON:** parsing of word-timestamp output files

pub mod transcription;
pub mod whisper_json;

pub use transcription::*;
pub use whisper_json::parse_whisper_json;
