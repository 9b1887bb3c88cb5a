//! One-call construction of both caption tracks from a transcript.

use reelsmith_common::config::CaptionConfig;

use crate::ass::SubtitleDocument;
use crate::segment::segment_lines;
use crate::split::{partition_lines, Track};
use crate::word::Word;

/// The Top and Middle subtitle documents for one narration.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTracks {
    pub top: SubtitleDocument,
    pub middle: SubtitleDocument,
}

impl CaptionTracks {
    /// Segment, split at `boundary`, and emit both documents.
    ///
    /// An empty transcript yields two header-only documents.
    pub fn build(words: &[Word], config: &CaptionConfig, boundary: f64) -> Self {
        let lines = segment_lines(words, config.max_words_per_line);
        let partition = partition_lines(&lines, boundary);

        tracing::debug!(
            words = words.len(),
            lines = lines.len(),
            top_fragments = partition.top.len(),
            middle_fragments = partition.middle.len(),
            boundary,
            "Caption tracks partitioned"
        );

        Self {
            top: SubtitleDocument::from_fragments(Track::Top, &partition.top, config),
            middle: SubtitleDocument::from_fragments(Track::Middle, &partition.middle, config),
        }
    }

    pub fn get(&self, track: Track) -> &SubtitleDocument {
        match track {
            Track::Top => &self.top,
            Track::Middle => &self.middle,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty() && self.middle.is_empty()
    }
}
