//! Boundary splitting of caption lines into Top/Middle track fragments.
//!
//! The screenshot is visible during `[0, boundary)`. Captions shown while it
//! is on screen sit at the top of the frame; afterwards they move to the
//! middle. A line that is already on screen when the screenshot disappears
//! is cut into two fragments with identical text and adjacent time windows.

use crate::segment::Line;
use crate::word::Word;

/// Which subtitle track a fragment is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    /// Top-center, while the screenshot is visible.
    Top,
    /// Middle-center, after the screenshot is gone.
    Middle,
}

impl Track {
    pub fn as_str(self) -> &'static str {
        match self {
            Track::Top => "top",
            Track::Middle => "middle",
        }
    }
}

/// A time window of one caption line, assigned to one track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment<'a> {
    pub track: Track,
    pub start: f64,
    pub end: f64,
    /// The owning line's full word list, in both halves of a split.
    pub words: &'a [Word],
}

impl Fragment<'_> {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Result of splitting one line at the boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Split<'a> {
    /// The line lies entirely on one side.
    Whole(Fragment<'a>),
    /// The line crosses the boundary: `top.end == boundary == middle.start`.
    Straddling {
        top: Fragment<'a>,
        middle: Fragment<'a>,
    },
}

impl<'a> Split<'a> {
    /// Fragments in time order.
    pub fn fragments(&self) -> impl Iterator<Item = Fragment<'a>> {
        let (first, second) = match *self {
            Split::Whole(fragment) => (fragment, None),
            Split::Straddling { top, middle } => (top, Some(middle)),
        };
        std::iter::once(first).chain(second)
    }
}

/// Assign a line to a track, splitting it if it straddles `boundary`.
pub fn split_line(line: Line<'_>, boundary: f64) -> Split<'_> {
    let whole = |track| {
        Split::Whole(Fragment {
            track,
            start: line.start(),
            end: line.end(),
            words: line.words(),
        })
    };

    // A line starting exactly on the boundary belongs to Middle, even a
    // zero-length one that also ends there.
    if line.start() >= boundary {
        whole(Track::Middle)
    } else if line.end() <= boundary {
        whole(Track::Top)
    } else {
        Split::Straddling {
            top: Fragment {
                track: Track::Top,
                start: line.start(),
                end: boundary,
                words: line.words(),
            },
            middle: Fragment {
                track: Track::Middle,
                start: boundary,
                end: line.end(),
                words: line.words(),
            },
        }
    }
}

/// Fragments of a whole transcript, grouped by track in time order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackPartition<'a> {
    pub top: Vec<Fragment<'a>>,
    pub middle: Vec<Fragment<'a>>,
}

impl<'a> TrackPartition<'a> {
    pub fn track(&self, track: Track) -> &[Fragment<'a>] {
        match track {
            Track::Top => &self.top,
            Track::Middle => &self.middle,
        }
    }

    pub fn len(&self) -> usize {
        self.top.len() + self.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty() && self.middle.is_empty()
    }
}

/// Split every line and route the fragments to their tracks.
pub fn partition_lines<'a>(lines: &[Line<'a>], boundary: f64) -> TrackPartition<'a> {
    let mut partition = TrackPartition::default();
    for line in lines {
        for fragment in split_line(*line, boundary).fragments() {
            match fragment.track {
                Track::Top => partition.top.push(fragment),
                Track::Middle => partition.middle.push(fragment),
            }
        }
    }
    partition
}
