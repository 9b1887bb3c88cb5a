//! Reelsmith Captions
//!
//! Turns word-level timestamps into two time-partitioned subtitle tracks:
//! - **Segmentation:** group words into caption lines of bounded size
//! - **Splitting:** cut lines at the screenshot boundary into Top/Middle fragments
//! - **Karaoke:** per-word highlight timing as inline ASS override tags
//! - **Emission:** one ASS document per track
//!
//! This crate is pure computation apart from [`SubtitleDocument::write_to`].

pub mod ass;
pub mod error;
pub mod karaoke;
pub mod segment;
pub mod split;
pub mod timecode;
pub mod tracks;
pub mod word;

pub use ass::{DialogueEvent, SubtitleDocument, SubtitleStyle};
pub use error::CaptionError;
pub use karaoke::{HighlightEvent, KaraokeColours};
pub use segment::{segment_lines, Line};
pub use split::{partition_lines, split_line, Fragment, Split, Track, TrackPartition};
pub use timecode::{format_timecode, parse_timecode};
pub use tracks::CaptionTracks;
pub use word::Word;
