use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use reelsmith_captions::Word;
use reelsmith_common::config::AppConfig;
use reelsmith_common::error::{ReelsmithError, ReelsmithResult};
use reelsmith_pipeline::Pipeline;
use reelsmith_render_engine::{CompositionPlan, RenderBackend};
use reelsmith_transcribe::Transcriber;

/// What the fake backend saw for one render call.
#[derive(Debug, Clone)]
struct RenderCall {
    output: PathBuf,
    top_ass: String,
    middle_ass: String,
    args: Vec<String>,
}

#[derive(Clone, Default)]
struct FakeBackend {
    calls: Arc<Mutex<Vec<RenderCall>>>,
    /// Directory holding the subtitle files of every render attempt.
    scratch_dirs: Arc<Mutex<Vec<PathBuf>>>,
    /// Narration stem whose render writes a truncated file and then fails.
    fail_for: Option<String>,
}

fn subtitle_path<'a>(plan: &'a CompositionPlan, stage: &str) -> &'a str {
    plan.graph
        .stage(stage)
        .and_then(|s| s.filter_named("subtitles"))
        .and_then(|f| f.option("filename"))
        .expect("subtitle stage present")
}

fn subtitle_file(plan: &CompositionPlan, stage: &str) -> String {
    std::fs::read_to_string(subtitle_path(plan, stage))
        .expect("subtitle file readable during render")
}

impl RenderBackend for FakeBackend {
    fn render(&mut self, plan: &CompositionPlan, output: &Path) -> ReelsmithResult<()> {
        let top = Path::new(subtitle_path(plan, "top_captions"));
        self.scratch_dirs
            .lock()
            .unwrap()
            .push(top.parent().unwrap().to_path_buf());

        let name = output.file_name().unwrap().to_string_lossy().into_owned();
        if let Some(stem) = &self.fail_for {
            if name.starts_with(&format!("{stem}.")) {
                std::fs::write(output, b"truncated moov")?;
                return Err(ReelsmithError::Render {
                status: "exit status: 1".to_string(),
                stdout: String::new(),
                stderr: "Error opening input".to_string(),
            });
            }
        }
        self.calls.lock().unwrap().push(RenderCall {
            output: output.to_path_buf(),
            top_ass: subtitle_file(plan, "top_captions"),
            middle_ass: subtitle_file(plan, "middle_captions"),
            args: plan.ffmpeg_args(output),
        });
        std::fs::write(output, b"mp4")?;
        Ok(())
    }

    fn probe_duration(&self, _media: &Path) -> ReelsmithResult<f64> {
        Ok(12.0)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Returns canned words keyed by narration file stem.
#[derive(Default)]
struct FakeTranscriber {
    words: HashMap<String, Vec<Word>>,
}

impl Transcriber for FakeTranscriber {
    fn transcribe(&self, audio_path: &Path) -> ReelsmithResult<Vec<Word>> {
        let stem = audio_path.file_stem().unwrap().to_string_lossy();
        Ok(self.words.get(&*stem).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn scenario_words() -> Vec<Word> {
    vec![
        Word::new("wow", 0.0, 0.4),
        Word::new("that", 0.4, 0.7),
        Word::new("is", 0.7, 0.9),
        Word::new("wild", 0.9, 1.3),
        Word::new("today", 1.3, 1.8),
    ]
}

struct Workspace {
    _dir: tempfile::TempDir,
    config: AppConfig,
}

impl Workspace {
    /// Assets present, one narration and one screenshot per id.
    fn new(ids: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let mut config = AppConfig::default();
        config.paths.assets_dir = root.join("assets");
        config.paths.screenshot_dir = root.join("shots");
        config.paths.audio_dir = root.join("audio");
        config.paths.output_dir = root.join("out");

        for sub in ["assets", "shots/funny", "audio"] {
            std::fs::create_dir_all(root.join(sub)).unwrap();
        }
        std::fs::write(config.paths.background_path(), b"bg").unwrap();
        std::fs::write(config.paths.avatar_path(), b"avatar").unwrap();

        let ws = Self { _dir: dir, config };
        for id in ids {
            ws.add_item(id, true);
        }
        ws
    }

    fn add_item(&self, id: &str, with_screenshot: bool) {
        let audio = self.config.paths.audio_dir.join(format!("{id}_story.mp3"));
        std::fs::write(audio, b"mp3").unwrap();
        if with_screenshot {
            let shot = self
                .config
                .paths
                .screenshot_dir
                .join("funny")
                .join(format!("tweet_{id}_20240101.png"));
            std::fs::write(shot, b"png").unwrap();
        }
    }

    fn output(&self, id: &str) -> PathBuf {
        self.config.paths.output_dir.join(format!("{id}_story.mp4"))
    }

    fn transcriber(&self, ids: &[&str]) -> FakeTranscriber {
        FakeTranscriber {
            words: ids
                .iter()
                .map(|id| (format!("{id}_story"), scenario_words()))
                .collect(),
        }
    }

    fn pipeline(&self, transcriber: FakeTranscriber, backend: FakeBackend) -> Pipeline {
        self.pipeline_with(self.config.clone(), transcriber, backend)
    }

    fn pipeline_with(
        &self,
        config: AppConfig,
        transcriber: FakeTranscriber,
        backend: FakeBackend,
    ) -> Pipeline {
        Pipeline::new(config, Box::new(transcriber), Box::new(backend))
    }
}

#[test]
fn renders_every_item_and_reruns_are_idempotent() {
    let ws = Workspace::new(&["101", "102"]);
    let backend = FakeBackend::default();

    let mut pipeline = ws.pipeline(ws.transcriber(&["101", "102"]), backend.clone());
    let report = pipeline.run_batch(None).unwrap();
    assert_eq!(report.discovered, 2);
    assert_eq!(report.rendered, 2);
    assert_eq!(report.skipped, 0);
    assert!(report.is_clean());
    assert!(ws.output("101").exists());
    assert!(ws.output("102").exists());

    let mut again = ws.pipeline(ws.transcriber(&["101", "102"]), backend.clone());
    let report = again.run_batch(None).unwrap();
    assert_eq!(report.rendered, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(backend.calls.lock().unwrap().len(), 2);
}

#[test]
fn caption_tracks_split_at_screenshot_boundary() {
    let ws = Workspace::new(&["7"]);
    let mut config = ws.config.clone();
    config.video.screenshot_secs = 1.0;
    let backend = FakeBackend::default();

    let mut pipeline = ws.pipeline_with(config, ws.transcriber(&["7"]), backend.clone());
    let report = pipeline.run_batch(None).unwrap();
    assert_eq!(report.rendered, 1);

    let calls = backend.calls.lock().unwrap();
    let call = &calls[0];
    let dialogue = |doc: &str| -> Vec<String> {
        doc.lines()
            .filter(|l| l.starts_with("Dialogue:"))
            .map(String::from)
            .collect()
    };

    let top = dialogue(&call.top_ass);
    assert_eq!(top.len(), 1);
    assert!(top[0].starts_with("Dialogue: 0,0:00:00.00,0:00:01.00,Default"));
    assert!(top[0].contains("WOW"));
    assert!(call.top_ass.contains("Narration - Top"));

    let middle = dialogue(&call.middle_ass);
    assert_eq!(middle.len(), 2);
    assert!(middle[0].starts_with("Dialogue: 0,0:00:01.00,0:00:01.30,Default"));
    assert!(middle[0].contains("WILD"));
    assert!(middle[1].starts_with("Dialogue: 0,0:00:01.30,0:00:01.80,Default"));
    assert!(middle[1].contains("TODAY"));

    assert!(call.args.windows(2).any(|w| w == ["-t", "12"]));
    assert_eq!(call.output.parent(), ws.output("7").parent());
    assert_ne!(call.output, ws.output("7"));
    assert!(ws.output("7").exists());
    assert!(!call.output.exists());
}

#[test]
fn missing_avatar_fails_items_without_output() {
    let ws = Workspace::new(&["101", "102"]);
    std::fs::remove_file(ws.config.paths.avatar_path()).unwrap();
    let backend = FakeBackend::default();

    let mut pipeline = ws.pipeline(ws.transcriber(&["101", "102"]), backend.clone());
    let report = pipeline.run_batch(None).unwrap();

    assert_eq!(report.rendered, 0);
    assert_eq!(report.failed.len(), 2);
    for failure in &report.failed {
        assert_eq!(failure.kind, "input-missing");
        assert!(failure.message.contains("avatar"));
    }
    assert!(!ws.output("101").exists());
    assert!(backend.calls.lock().unwrap().is_empty());
}

#[test]
fn missing_screenshot_does_not_stop_other_items() {
    let ws = Workspace::new(&["101"]);
    ws.add_item("555", false);
    let backend = FakeBackend::default();

    let mut pipeline = ws.pipeline(ws.transcriber(&["101", "555"]), backend);
    let report = pipeline.run_batch(None).unwrap();

    assert_eq!(report.rendered, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].item, "555_story.mp3");
    assert!(report.failed[0].message.contains("screenshot"));
    assert!(ws.output("101").exists());
    assert!(!ws.output("555").exists());
}

#[test]
fn empty_transcript_is_skipped_by_default() {
    let ws = Workspace::new(&["9"]);
    let backend = FakeBackend::default();

    let mut pipeline = ws.pipeline(FakeTranscriber::default(), backend.clone());
    let report = pipeline.run_batch(None).unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].kind, "transcription-empty");
    assert!(!ws.output("9").exists());
}

#[test]
fn empty_transcript_renders_without_captions_when_allowed() {
    let ws = Workspace::new(&["9"]);
    let mut config = ws.config.clone();
    config.captions.allow_empty_transcript = true;
    let backend = FakeBackend::default();

    let mut pipeline = ws.pipeline_with(config, FakeTranscriber::default(), backend.clone());
    let report = pipeline.run_batch(None).unwrap();

    assert_eq!(report.rendered, 1);
    let calls = backend.calls.lock().unwrap();
    for doc in [&calls[0].top_ass, &calls[0].middle_ass] {
        assert!(doc.contains("[Events]"));
        assert!(!doc.contains("Dialogue:"));
    }
}

#[test]
fn limit_counts_only_pending_items() {
    let ws = Workspace::new(&["1", "2", "3"]);
    std::fs::create_dir_all(&ws.config.paths.output_dir).unwrap();
    std::fs::write(ws.output("1"), b"done").unwrap();
    let backend = FakeBackend::default();

    let mut pipeline = ws.pipeline(ws.transcriber(&["1", "2", "3"]), backend.clone());
    let report = pipeline.run_batch(Some(1)).unwrap();
    assert_eq!(report.discovered, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.rendered, 1);
    assert!(ws.output("2").exists());
    assert!(!ws.output("3").exists());

    let report = pipeline.run_batch(Some(1)).unwrap();
    assert_eq!(report.skipped, 2);
    assert_eq!(report.rendered, 1);
    assert!(ws.output("3").exists());
}

#[test]
fn render_failure_is_contained() {
    let ws = Workspace::new(&["1", "2"]);
    let backend = FakeBackend {
        fail_for: Some("1_story".to_string()),
        ..FakeBackend::default()
    };

    let mut pipeline = ws.pipeline(ws.transcriber(&["1", "2"]), backend);
    let report = pipeline.run_batch(None).unwrap();

    assert_eq!(report.rendered, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].kind, "render-failure");
    assert!(report.failed[0].message.contains("Error opening input"));
    assert!(ws.output("2").exists());
}

#[test]
fn failed_render_leaves_no_output_and_is_retried() {
    let ws = Workspace::new(&["1"]);
    let failing = FakeBackend {
        fail_for: Some("1_story".to_string()),
        ..FakeBackend::default()
    };

    let mut pipeline = ws.pipeline(ws.transcriber(&["1"]), failing);
    let report = pipeline.run_batch(None).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert!(!ws.output("1").exists());
    let leftovers: Vec<_> = std::fs::read_dir(&ws.config.paths.output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");

    let report = pipeline.run_batch(None).unwrap();
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed.len(), 1);

    let healthy = FakeBackend::default();
    let mut retry = ws.pipeline(ws.transcriber(&["1"]), healthy.clone());
    let report = retry.run_batch(None).unwrap();
    assert_eq!(report.skipped, 0);
    assert_eq!(report.rendered, 1);
    assert_eq!(std::fs::read(ws.output("1")).unwrap(), b"mp4");
}

#[test]
fn stale_partial_render_is_replaced() {
    let ws = Workspace::new(&["4"]);
    std::fs::create_dir_all(&ws.config.paths.output_dir).unwrap();
    let stale = ws.config.paths.output_dir.join("4_story.part.mp4");
    std::fs::write(&stale, b"interrupted").unwrap();

    let mut pipeline = ws.pipeline(ws.transcriber(&["4"]), FakeBackend::default());
    let report = pipeline.run_batch(None).unwrap();

    assert_eq!(report.discovered, 1);
    assert_eq!(report.rendered, 1);
    assert!(!stale.exists());
    assert_eq!(std::fs::read(ws.output("4")).unwrap(), b"mp4");
}

#[test]
fn scratch_directory_is_removed_after_each_item() {
    let ws = Workspace::new(&["1", "2"]);
    let backend = FakeBackend {
        fail_for: Some("2_story".to_string()),
        ..FakeBackend::default()
    };

    let mut pipeline = ws.pipeline(ws.transcriber(&["1", "2"]), backend.clone());
    let report = pipeline.run_batch(None).unwrap();
    assert_eq!(report.rendered, 1);
    assert_eq!(report.failed.len(), 1);

    let scratch = backend.scratch_dirs.lock().unwrap();
    assert_eq!(scratch.len(), 2);
    assert_ne!(scratch[0], scratch[1]);
    for dir in scratch.iter() {
        assert!(
            dir.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("reelsmith-item-"),
            "{}",
            dir.display()
        );
        assert!(!dir.exists(), "scratch dir left behind: {}", dir.display());
    }
}

#[test]
fn output_directory_is_created() {
    let ws = Workspace::new(&[]);
    assert!(!ws.config.paths.output_dir.exists());

    let mut pipeline = ws.pipeline(FakeTranscriber::default(), FakeBackend::default());
    let report = pipeline.run_batch(None).unwrap();

    assert_eq!(report.discovered, 0);
    assert!(ws.config.paths.output_dir.is_dir());
}
