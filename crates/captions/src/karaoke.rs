//! Karaoke highlight timing and ASS inline markup.
//!
//! Each word is rendered as `{\k<cs>\c<highlight>}WORD{\c<base>}` and words
//! are joined by a single space. Durations come from the word's own
//! recognized span, never from a boundary-clipped window.

use crate::word::Word;

/// Colours used by the inline colour flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KaraokeColours {
    /// Normal text colour (ASS `&HAABBGGRR`).
    pub base: String,
    /// Colour of the word being spoken.
    pub highlight: String,
}

/// Highlight timing for one word of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightEvent {
    /// Upper-cased caption text.
    pub text: String,
    /// Word start relative to the fragment start, in centiseconds. Negative
    /// for words spoken before a Middle fragment begins.
    pub offset_cs: i64,
    /// How long the word stays highlighted, in centiseconds.
    pub duration_cs: u32,
}

/// Compute highlight events for `words`, with offsets relative to `anchor`.
///
/// Per-word durations are differences of rounded cumulative durations, so
/// their sum is exactly `round(total * 100)` while each word stays within one
/// centisecond of `round(duration * 100)`.
pub fn highlight_events(words: &[Word], anchor: f64) -> Vec<HighlightEvent> {
    let mut elapsed = 0.0f64;
    let mut emitted_cs = 0i64;

    words
        .iter()
        .map(|word| {
            elapsed += word.duration();
            let cumulative_cs = (elapsed * 100.0).round() as i64;
            let duration_cs = (cumulative_cs - emitted_cs).max(0) as u32;
            emitted_cs = cumulative_cs;

            HighlightEvent {
                text: word.display_text(),
                offset_cs: ((word.start - anchor) * 100.0).round() as i64,
                duration_cs,
            }
        })
        .collect()
}

/// Render highlight events as a single ASS text field.
pub fn render_markup(events: &[HighlightEvent], colours: &KaraokeColours) -> String {
    events
        .iter()
        .map(|event| {
            format!(
                "{{\\k{}\\c{}}}{}{{\\c{}}}",
                event.duration_cs, colours.highlight, event.text, colours.base
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Karaoke markup for a line's words.
pub fn karaoke_markup(words: &[Word], colours: &KaraokeColours) -> String {
    let anchor = words.first().map(|w| w.start).unwrap_or(0.0);
    render_markup(&highlight_events(words, anchor), colours)
}

/// Sum of `\k` durations in a piece of markup, in centiseconds.
pub fn total_highlight_cs(markup: &str) -> u64 {
    markup
        .split("{\\k")
        .skip(1)
        .filter_map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u64>().ok()
        })
        .sum()
}
