//! Word-level timestamps, as produced by the transcriber.

use serde::{Deserialize, Serialize};

use crate::error::CaptionError;

/// One recognized word with its spoken interval in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Raw token text (may carry leading whitespace from the recognizer).
    #[serde(alias = "word")]
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Spoken duration in seconds (zero for degenerate spans).
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Caption text: trimmed and upper-cased.
    pub fn display_text(&self) -> String {
        self.text.trim().to_uppercase()
    }
}

/// Check that a transcript is usable for captioning.
///
/// Times must be finite with `start <= end`, and starts must be
/// non-decreasing. Small overlaps between neighbouring words are accepted;
/// recognizers produce them routinely.
pub fn validate_words(words: &[Word]) -> Result<(), CaptionError> {
    let mut previous_start = f64::NEG_INFINITY;
    for (index, word) in words.iter().enumerate() {
        if !word.start.is_finite() || !word.end.is_finite() || word.end < word.start {
            return Err(CaptionError::InvalidWord {
                index,
                text: word.text.clone(),
                start: word.start,
                end: word.end,
            });
        }
        if word.start < previous_start {
            return Err(CaptionError::OutOfOrder {
                index,
                start: word.start,
                previous: previous_start,
            });
        }
        previous_start = word.start;
    }
    Ok(())
}
