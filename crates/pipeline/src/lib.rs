//! Reelsmith Pipeline
//!
//! Batch driver: discovers narration files, resolves each one's screenshot
//! and shared assets, transcribes, writes the caption tracks and renders.
//! Items run one after another and fail independently.

pub mod discover;
pub mod pipeline;
pub mod report;
pub mod screenshot;

pub use discover::{discover_items, item_id, WorkItem};
pub use pipeline::Pipeline;
pub use report::{BatchReport, ItemFailure, ItemOutcome};
pub use screenshot::find_screenshot;
