//! Caption-level errors.

use reelsmith_common::error::ReelsmithError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptionError {
    #[error("word {index} ({text:?}) has invalid timing {start}..{end}")]
    InvalidWord {
        index: usize,
        text: String,
        start: f64,
        end: f64,
    },

    #[error("word {index} starts at {start} before the previous word at {previous}")]
    OutOfOrder {
        index: usize,
        start: f64,
        previous: f64,
    },

    #[error("invalid timecode {0:?}, expected H:MM:SS.cc")]
    InvalidTimecode(String),
}

impl From<CaptionError> for ReelsmithError {
    fn from(err: CaptionError) -> Self {
        ReelsmithError::caption(err.to_string())
    }
}
