//! Local transcription using Whisper.
//!
//! Runs speech-to-text inference locally (no cloud APIs) through the
//! `whisper` command-line tool with word timestamps enabled.

use std::path::{Path, PathBuf};
use std::process::Command;

use reelsmith_captions::Word;
use reelsmith_common::config::TranscriptionSettings;
use reelsmith_common::error::{ReelsmithError, ReelsmithResult};
use reelsmith_common::process::{command_exists, lossy_output};
use serde::{Deserialize, Serialize};

use crate::whisper_json::parse_whisper_json;

/// Whisper model size selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhisperModel {
    /// Fastest, least accurate (~39 MB).
    Tiny,
    /// Good balance of speed and accuracy (~142 MB).
    Base,
    /// Better accuracy, slower (~466 MB).
    Small,
    /// High accuracy (~1.5 GB).
    Medium,
    /// Best accuracy, slowest (~2.9 GB).
    Large,
}

impl WhisperModel {
    /// Name passed to `whisper --model`.
    pub fn name(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::Base => "base",
            WhisperModel::Small => "small",
            WhisperModel::Medium => "medium",
            WhisperModel::Large => "large",
        }
    }

    pub fn parse(name: &str) -> ReelsmithResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "tiny" => Ok(WhisperModel::Tiny),
            "base" => Ok(WhisperModel::Base),
            "small" => Ok(WhisperModel::Small),
            "medium" => Ok(WhisperModel::Medium),
            "large" => Ok(WhisperModel::Large),
            other => Err(ReelsmithError::config(format!(
                "Unknown whisper model: {other}. Use: tiny, base, small, medium, large"
            ))),
        }
    }
}

/// Configuration for transcription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Model to use.
    pub model: WhisperModel,

    /// Language hint (ISO 639-1 code, e.g., "en").
    pub language: Option<String>,

    /// Executable name or path.
    pub executable: PathBuf,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: WhisperModel::Base,
            language: Some("en".to_string()),
            executable: PathBuf::from("whisper"),
        }
    }
}

impl TranscriptionConfig {
    pub fn from_settings(settings: &TranscriptionSettings) -> ReelsmithResult<Self> {
        Ok(Self {
            model: WhisperModel::parse(&settings.model)?,
            language: settings.language.clone(),
            executable: PathBuf::from(&settings.executable),
        })
    }
}

/// Source of word-level timestamps for a narration file.
pub trait Transcriber {
    /// Ordered words for `audio_path`. An empty vector means the audio was
    /// processed but nothing was recognized.
    fn transcribe(&self, audio_path: &Path) -> ReelsmithResult<Vec<Word>>;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Whisper CLI handle.
///
/// Built once per batch and shared by reference with every item.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    config: TranscriptionConfig,
}

impl WhisperCli {
    /// Check that the executable is reachable and build the handle.
    pub fn load(config: TranscriptionConfig) -> ReelsmithResult<Self> {
        let executable = config.executable.display().to_string();
        if !config.executable.is_file() && !command_exists(&executable) {
            return Err(ReelsmithError::unsupported(format!(
                "Whisper executable '{executable}' not found (install openai-whisper)"
            )));
        }
        tracing::info!(
            executable = %executable,
            model = config.model.name(),
            "Whisper transcriber ready"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &TranscriptionConfig {
        &self.config
    }

    fn command(&self, audio_path: &Path, output_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.executable);
        cmd.arg(audio_path)
            .args(["--model", self.config.model.name()])
            .args(["--word_timestamps", "True"])
            .args(["--output_format", "json"])
            .arg("--output_dir")
            .arg(output_dir)
            .args(["--verbose", "False"]);
        if let Some(language) = &self.config.language {
            cmd.arg("--language").arg(language);
        }
        cmd
    }
}

impl Transcriber for WhisperCli {
    fn transcribe(&self, audio_path: &Path) -> ReelsmithResult<Vec<Word>> {
        tracing::info!(
            path = %audio_path.display(),
            model = ?self.config.model,
            "Starting transcription"
        );

        if !audio_path.exists() {
            return Err(ReelsmithError::FileNotFound {
                path: audio_path.to_path_buf(),
            });
        }

        let scratch = tempfile::Builder::new()
            .prefix("reelsmith-whisper-")
            .tempdir()?;
        let started = std::time::Instant::now();
        let output = self
            .command(audio_path, scratch.path())
            .output()
            .map_err(|e| ReelsmithError::transcription(format!("Failed to start whisper: {e}")))?;

        if !output.status.success() {
            return Err(ReelsmithError::transcription(format!(
                "whisper failed (status {}): {}",
                output.status,
                lossy_output(&output.stderr)
            )));
        }

        let stem = audio_path
            .file_stem()
            .ok_or_else(|| ReelsmithError::transcription("Audio path has no file name"))?;
        let json_path = scratch
            .path()
            .join(format!("{}.json", stem.to_string_lossy()));
        let content = std::fs::read_to_string(&json_path).map_err(|e| {
            ReelsmithError::transcription(format!(
                "Failed to read whisper output {}: {e}",
                json_path.display()
            ))
        })?;
        let words = parse_whisper_json(&content)?;

        tracing::info!(
            words = words.len(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Transcription complete"
        );
        Ok(words)
    }

    fn name(&self) -> &str {
        "whisper-cli"
    }
}
