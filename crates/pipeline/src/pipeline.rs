//! Sequential batch driver.

use std::path::Path;

use reelsmith_captions::word::validate_words;
use reelsmith_captions::CaptionTracks;
use reelsmith_common::config::AppConfig;
use reelsmith_common::error::{AssetKind, ReelsmithError, ReelsmithResult};
use reelsmith_render_engine::{build_composition, CompositionAssets, RenderBackend, SubtitleInputs};
use reelsmith_transcribe::Transcriber;

use crate::discover::{discover_items, WorkItem};
use crate::report::{BatchReport, ItemOutcome};
use crate::screenshot::find_screenshot;

const TOP_SUBTITLES: &str = "top.ass";
const MIDDLE_SUBTITLES: &str = "middle.ass";

/// Owns the configuration and the external tool handles for a batch.
pub struct Pipeline {
    config: AppConfig,
    transcriber: Box<dyn Transcriber>,
    backend: Box<dyn RenderBackend>,
}

impl Pipeline {
    pub fn new(
        config: AppConfig,
        transcriber: Box<dyn Transcriber>,
        backend: Box<dyn RenderBackend>,
    ) -> Self {
        Self {
            config,
            transcriber,
            backend,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Render every pending narration, at most `limit` of them.
    ///
    /// Items whose output already exists are counted as skipped and do not
    /// use up the limit. Item failures are logged and recorded; they never
    /// abort the batch.
    pub fn run_batch(&mut self, limit: Option<usize>) -> ReelsmithResult<BatchReport> {
        let paths = &self.config.paths;
        std::fs::create_dir_all(&paths.output_dir)?;

        let items = discover_items(&paths.audio_dir, &paths.output_dir, &paths.audio_extension)?;
        let mut report = BatchReport::start(items.len());

        let (existing, pending): (Vec<WorkItem>, Vec<WorkItem>) =
            items.into_iter().partition(|item| item.output.exists());
        for item in &existing {
            tracing::info!(item = %item.name(), output = %item.output.display(), "Skipping, output exists");
            report.record(&item.name(), &Ok(ItemOutcome::AlreadyExists));
        }

        let selected = limit.unwrap_or(pending.len()).min(pending.len());
        tracing::info!(
            discovered = report.discovered,
            existing = existing.len(),
            pending = pending.len(),
            selected,
            backend = self.backend.name(),
            transcriber = self.transcriber.name(),
            "Starting batch"
        );

        for (index, item) in pending.iter().take(selected).enumerate() {
            tracing::info!(
                item = %item.name(),
                id = %item.id,
                position = index + 1,
                total = selected,
                "Processing item"
            );
            let started = std::time::Instant::now();
            let result = self.process_item(item);
            match &result {
                Ok(outcome) => tracing::info!(
                    item = %item.name(),
                    outcome = ?outcome,
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "Item finished"
                ),
                Err(err) => tracing::error!(
                    item = %item.name(),
                    kind = err.kind(),
                    error = %err,
                    "Item failed"
                ),
            }
            report.record(&item.name(), &result);
        }

        report.finish();
        tracing::info!(
            discovered = report.discovered,
            rendered = report.rendered,
            skipped = report.skipped,
            failed = report.failed.len(),
            elapsed_secs = report.elapsed_secs(),
            "Batch complete"
        );
        Ok(report)
    }

    /// Produce the video for one item.
    pub fn process_item(&mut self, item: &WorkItem) -> ReelsmithResult<ItemOutcome> {
        if item.output.exists() {
            return Ok(ItemOutcome::AlreadyExists);
        }

        let assets = self.resolve_assets(item)?;
        assets.verify()?;

        let scratch = tempfile::Builder::new()
            .prefix("reelsmith-item-")
            .tempdir()?;

        let duration_secs = self.backend.probe_duration(&item.audio)?;
        let words = self.transcriber.transcribe(&item.audio)?;
        if words.is_empty() {
            if !self.config.captions.allow_empty_transcript {
                return Err(ReelsmithError::EmptyTranscript {
                    audio: item.audio.clone(),
                });
            }
            tracing::warn!(item = %item.name(), "Empty transcript, rendering without captions");
        }
        validate_words(&words)?;

        let tracks = CaptionTracks::build(
            &words,
            &self.config.captions,
            self.config.video.screenshot_secs,
        );
        let subtitles = write_subtitles(&tracks, scratch.path())?;

        let plan = build_composition(&assets, &subtitles, &self.config.video, duration_secs)?;

        // Only a finished render may appear under the final name, otherwise
        // a failed item would count as already done on the next run.
        let partial = item.partial_output();
        discard_partial(&partial);
        if let Err(err) = self.backend.render(&plan, &partial) {
            discard_partial(&partial);
            return Err(err);
        }
        std::fs::rename(&partial, &item.output)?;
        Ok(ItemOutcome::Rendered)
    }

    fn resolve_assets(&self, item: &WorkItem) -> ReelsmithResult<CompositionAssets> {
        let paths = &self.config.paths;
        let screenshot = find_screenshot(&paths.screenshot_dir, &item.id).ok_or_else(|| {
            ReelsmithError::missing_asset(
                AssetKind::Screenshot,
                paths.screenshot_dir.join(format!("tweet_{}_*.png", item.id)),
            )
        })?;

        Ok(CompositionAssets {
            background: paths.background_path(),
            screenshot,
            avatar: paths.avatar_path(),
            narration: item.audio.clone(),
        })
    }
}

fn discard_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed partial render"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => tracing::warn!(
            path = %path.display(),
            error = %err,
            "Failed to remove partial render"
        ),
    }
}

fn write_subtitles(tracks: &CaptionTracks, dir: &Path) -> ReelsmithResult<SubtitleInputs> {
    let subtitles = SubtitleInputs {
        top: dir.join(TOP_SUBTITLES),
        middle: dir.join(MIDDLE_SUBTITLES),
    };
    tracks.top.write_to(&subtitles.top)?;
    tracks.middle.write_to(&subtitles.middle)?;
    Ok(subtitles)
}
