//! ASS (Advanced SubStation Alpha) subtitle documents, one per track.

use std::fmt;
use std::path::Path;

use reelsmith_common::config::CaptionConfig;
use reelsmith_common::error::ReelsmithResult;

use crate::karaoke::{highlight_events, render_markup, KaraokeColours};
use crate::split::{Fragment, Track};
use crate::timecode::format_timecode;

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";
const STYLE_NAME: &str = "Default";

/// The single style declared by a track's document.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleStyle {
    pub font: String,
    pub font_size: u32,
    pub primary_colour: String,
    pub secondary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    pub bold: bool,
    pub italic: bool,
    pub border_style: u8,
    pub outline: u32,
    pub shadow: u32,
    /// Numpad alignment: 8 = top-center, 5 = middle-center.
    pub alignment: u8,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
    pub encoding: u8,
}

impl SubtitleStyle {
    /// Style for `track`, sharing font, size, colours and outline.
    pub fn for_track(track: Track, config: &CaptionConfig) -> Self {
        let (alignment, margin_v) = match track {
            Track::Top => (8, 50),
            Track::Middle => (5, 30),
        };
        Self {
            font: config.font.clone(),
            font_size: config.font_size,
            primary_colour: config.colour.clone(),
            secondary_colour: "&H00FFFFFF".to_string(),
            outline_colour: config.outline_colour.clone(),
            back_colour: config.back_colour.clone(),
            bold: true,
            italic: false,
            border_style: 1,
            outline: config.outline_width,
            shadow: 0,
            alignment,
            margin_l: 30,
            margin_r: 30,
            margin_v,
            encoding: 1,
        }
    }

    fn style_line(&self) -> String {
        // ASS booleans are -1 (true) / 0 (false).
        let flag = |on: bool| if on { -1 } else { 0 };
        format!(
            "Style: {name},{font},{size},{primary},{secondary},{outline_c},{back},{bold},{italic},0,0,100,100,0,0,{border},{outline},{shadow},{align},{ml},{mr},{mv},{enc}",
            name = STYLE_NAME,
            font = self.font,
            size = self.font_size,
            primary = self.primary_colour,
            secondary = self.secondary_colour,
            outline_c = self.outline_colour,
            back = self.back_colour,
            bold = flag(self.bold),
            italic = flag(self.italic),
            border = self.border_style,
            outline = self.outline,
            shadow = self.shadow,
            align = self.alignment,
            ml = self.margin_l,
            mr = self.margin_r,
            mv = self.margin_v,
            enc = self.encoding,
        )
    }
}

/// One `Dialogue:` line.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueEvent {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl DialogueEvent {
    fn line(&self) -> String {
        format!(
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            format_timecode(self.start),
            format_timecode(self.end),
            STYLE_NAME,
            self.text
        )
    }
}

/// A complete subtitle document for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleDocument {
    pub track: Track,
    pub title: String,
    pub style: SubtitleStyle,
    pub events: Vec<DialogueEvent>,
}

impl SubtitleDocument {
    /// Build a document from the fragments routed to `track`.
    ///
    /// Fragments of the other track are ignored, so a mixed slice is safe.
    pub fn from_fragments(track: Track, fragments: &[Fragment<'_>], config: &CaptionConfig) -> Self {
        let colours = KaraokeColours {
            base: config.colour.clone(),
            highlight: config.highlight_colour.clone(),
        };

        let events = fragments
            .iter()
            .filter(|fragment| fragment.track == track)
            .map(|fragment| DialogueEvent {
                start: fragment.start,
                end: fragment.end,
                text: render_markup(&highlight_events(fragment.words, fragment.start), &colours),
            })
            .collect();

        Self {
            track,
            title: format!("Narration - {}", title_case(track.as_str())),
            style: SubtitleStyle::for_track(track, config),
            events,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Write the rendered document to `path`.
    pub fn write_to(&self, path: &Path) -> ReelsmithResult<()> {
        std::fs::write(path, self.to_string())?;
        tracing::debug!(
            path = %path.display(),
            track = self.track.as_str(),
            events = self.events.len(),
            "Wrote subtitle document"
        );
        Ok(())
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Script Info]")?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "ScriptType: v4.00+")?;
        writeln!(f, "WrapStyle: 0")?;
        writeln!(f, "ScaledBorderAndShadow: yes")?;
        writeln!(f, "YCbCr Matrix: None")?;
        writeln!(f)?;
        writeln!(f, "[V4+ Styles]")?;
        writeln!(f, "{STYLE_FORMAT}")?;
        writeln!(f, "{}", self.style.style_line())?;
        writeln!(f)?;
        writeln!(f, "[Events]")?;
        writeln!(f, "{EVENT_FORMAT}")?;
        for event in &self.events {
            writeln!(f, "{}", event.line())?;
        }
        Ok(())
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
