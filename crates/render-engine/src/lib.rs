//! Reelsmith Render Engine
//!
//! Offline composition of one short vertical video from a looping
//! gameplay clip, a post screenshot, an avatar, narration audio and two
//! karaoke caption tracks.
//!
//! # Pipeline Architecture
//!
//! ```text
//! background.mp4 ──┐
//!                  ├── Crop/Scale (9:16)
//!                  │         │
//! screenshot.png ──┴─────────├── Screenshot Overlay (0..B)
//!                            │         │
//! avatar.png ────────────────┴─────────├── Avatar Overlay
//!                                      │         │
//! top.ass ─────────────────────────────┴─────────├── Top Captions
//!                                                │         │
//! middle.ass ────────────────────────────────────┴─────────├── Middle Captions
//!                                                          │
//! narration.mp3 ───────────────────────────────────────────├── Encode (H.264 + AAC)
//!                                                          ▼
//!                                                      output.mp4
//! ```

pub mod compose;
pub mod export;
pub mod graph;

pub use compose::*;
pub use export::*;
pub use graph::{escape_filter_value, Filter, FilterGraph, Pad, Stage, StreamKind};
