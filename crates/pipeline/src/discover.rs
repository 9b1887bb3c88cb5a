//! Discovery of narration files and their output targets.

use std::path::{Path, PathBuf};

use reelsmith_common::error::{ReelsmithError, ReelsmithResult};

/// One narration file and the video it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Post id used to look up the screenshot.
    pub id: String,
    pub audio: PathBuf,
    pub output: PathBuf,
}

impl WorkItem {
    pub fn from_audio(audio: PathBuf, output_dir: &Path) -> Option<Self> {
        let stem = audio.file_stem()?.to_str()?.to_string();
        Some(Self {
            id: item_id(&stem).to_string(),
            output: output_dir.join(format!("{stem}.mp4")),
            audio,
        })
    }

    /// Where the renderer writes before the result is moved to `output`.
    ///
    /// Keeps the `.mp4` extension so the muxer is still picked from the name.
    pub fn partial_output(&self) -> PathBuf {
        let stem = self
            .output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output.with_file_name(format!("{stem}.part.mp4"))
    }

    /// File name of the narration, for log lines.
    pub fn name(&self) -> String {
        self.audio
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.audio.display().to_string())
    }
}

/// The part of a narration stem before the first `_`.
pub fn item_id(stem: &str) -> &str {
    stem.split('_').next().unwrap_or(stem)
}

/// Audio files directly under `audio_dir` with the given extension, sorted by
/// path, each paired with `<output_dir>/<stem>.mp4`.
pub fn discover_items(
    audio_dir: &Path,
    output_dir: &Path,
    extension: &str,
) -> ReelsmithResult<Vec<WorkItem>> {
    if !audio_dir.is_dir() {
        return Err(ReelsmithError::FileNotFound {
            path: audio_dir.to_path_buf(),
        });
    }

    let extension = extension.trim_start_matches('.');
    let mut audio_files = Vec::new();
    for entry in std::fs::read_dir(audio_dir)? {
        let path = entry?.path();
        let matches = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            audio_files.push(path);
        }
    }
    audio_files.sort();

    let items: Vec<WorkItem> = audio_files
        .into_iter()
        .filter_map(|audio| {
            let item = WorkItem::from_audio(audio.clone(), output_dir);
            if item.is_none() {
                tracing::warn!(path = %audio.display(), "Skipping audio file with non UTF-8 name");
            }
            item
        })
        .collect();

    tracing::debug!(
        audio_dir = %audio_dir.display(),
        count = items.len(),
        "Discovered narration files"
    );
    Ok(items)
}
