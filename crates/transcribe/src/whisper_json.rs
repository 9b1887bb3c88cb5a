//! Whisper `--output_format json` parsing.

use reelsmith_captions::Word;
use reelsmith_common::error::ReelsmithResult;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    #[serde(default)]
    words: Vec<WhisperWord>,
}

#[derive(Debug, Deserialize)]
struct WhisperWord {
    word: String,
    start: f64,
    end: f64,
}

/// Flatten `segments[].words[]` into one ordered word list.
///
/// Tokens that are empty after trimming carry no caption text and are
/// dropped.
pub fn parse_whisper_json(content: &str) -> ReelsmithResult<Vec<Word>> {
    let output: WhisperOutput = serde_json::from_str(content)?;
    Ok(output
        .segments
        .into_iter()
        .flat_map(|segment| segment.words)
        .filter(|w| !w.word.trim().is_empty())
        .map(|w| Word::new(w.word, w.start, w.end))
        .collect())
}
