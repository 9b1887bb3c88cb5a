//! Line segmentation: greedy, size-driven grouping of words.

use crate::word::Word;

/// A caption line: a run of consecutive transcript words.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<'a> {
    words: &'a [Word],
}

impl<'a> Line<'a> {
    /// Lines are never empty; `None` for an empty slice.
    pub fn new(words: &'a [Word]) -> Option<Self> {
        if words.is_empty() {
            None
        } else {
            Some(Self { words })
        }
    }

    pub fn words(&self) -> &'a [Word] {
        self.words
    }

    pub fn start(&self) -> f64 {
        self.words[0].start
    }

    pub fn end(&self) -> f64 {
        self.words[self.words.len() - 1].end
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Group `words` into lines of at most `max_words` (a zero limit acts as 1).
///
/// Every line but the last holds exactly `max_words` words. No look-ahead
/// rebalancing is done.
pub fn segment_lines(words: &[Word], max_words: usize) -> Vec<Line<'_>> {
    words
        .chunks(max_words.max(1))
        .filter_map(Line::new)
        .collect()
}
