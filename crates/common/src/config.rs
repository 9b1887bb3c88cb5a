//! Application configuration.
//!
//! Every field has a default, so a config file only needs to name the
//! values it overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReelsmithError, ReelsmithResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input and output locations.
    pub paths: PathsConfig,

    /// Output video composition parameters.
    pub video: VideoConfig,

    /// Caption styling and line grouping.
    pub captions: CaptionConfig,

    /// Speech-to-text settings.
    pub transcription: TranscriptionSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// File-system layout for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the background clip and avatar image.
    pub assets_dir: PathBuf,

    /// Directory searched (recursively) for screenshots.
    pub screenshot_dir: PathBuf,

    /// Directory of narration audio files.
    pub audio_dir: PathBuf,

    /// Directory rendered videos are written to.
    pub output_dir: PathBuf,

    /// Extension of narration files to pick up (without the dot).
    pub audio_extension: String,

    /// Background clip file name inside `assets_dir`.
    pub background_file: String,

    /// Avatar image file name inside `assets_dir`.
    pub avatar_file: String,
}

/// Output video parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Output width in pixels.
    pub width: u32,

    /// Output height in pixels.
    pub height: u32,

    /// Output frame rate.
    pub fps: u32,

    /// How long the screenshot stays on screen. This is also the caption
    /// track boundary.
    pub screenshot_secs: f64,

    /// Avatar width in pixels (height keeps aspect).
    pub avatar_width: u32,

    /// Avatar distance from the bottom-right corner in pixels.
    pub avatar_margin: u32,

    /// x264 preset.
    pub preset: String,
}

/// Caption styling shared by both subtitle tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub font: String,
    pub font_size: u32,

    /// Base text colour (ASS `&HAABBGGRR`).
    pub colour: String,

    /// Colour of the word currently being spoken.
    pub highlight_colour: String,

    pub outline_colour: String,
    pub back_colour: String,
    pub outline_width: u32,

    /// Maximum words grouped into one caption line.
    pub max_words_per_line: usize,

    /// Render items whose transcript came back empty (without captions)
    /// instead of skipping them.
    pub allow_empty_transcript: bool,
}

/// Speech-to-text settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model name (tiny, base, small, medium, large).
    pub model: String,

    /// Language hint (ISO 639-1 code).
    pub language: Option<String>,

    /// Whisper executable to invoke.
    pub executable: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "reelsmith=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("video_assets"),
            screenshot_dir: PathBuf::from("twitter_analysis/screenshots"),
            audio_dir: PathBuf::from("chatterbox/audio_production/final_audio"),
            output_dir: PathBuf::from("final_videos_ffmpeg"),
            audio_extension: "mp3".to_string(),
            background_file: "background_gameplay.mp4".to_string(),
            avatar_file: "peter_avatar.png".to_string(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 60,
            screenshot_secs: 5.0,
            avatar_width: 500,
            avatar_margin: 30,
            preset: "ultrafast".to_string(),
        }
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            font: "Impact".to_string(),
            font_size: 18,
            colour: "&H00FFFFFF".to_string(),
            highlight_colour: "&H00207BBB".to_string(),
            outline_colour: "&H000000".to_string(),
            back_colour: "&H00000000".to_string(),
            outline_width: 3,
            max_words_per_line: 4,
            allow_empty_transcript: false,
        }
    }
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            language: Some("en".to_string()),
            executable: "whisper".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl PathsConfig {
    pub fn background_path(&self) -> PathBuf {
        self.assets_dir.join(&self.background_file)
    }

    pub fn avatar_path(&self) -> PathBuf {
        self.assets_dir.join(&self.avatar_file)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], a bad
    /// file is an error.
    pub fn load_from(path: &Path) -> ReelsmithResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> ReelsmithResult<()> {
        if self.video.width == 0 || self.video.height == 0 {
            return Err(ReelsmithError::config("video resolution must be non-zero"));
        }
        if self.video.fps == 0 {
            return Err(ReelsmithError::config("video fps must be non-zero"));
        }
        if !self.video.screenshot_secs.is_finite() || self.video.screenshot_secs < 0.0 {
            return Err(ReelsmithError::config(
                "screenshot_secs must be a non-negative number",
            ));
        }
        if self.captions.max_words_per_line == 0 {
            return Err(ReelsmithError::config("max_words_per_line must be at least 1"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("reelsmith").join("config.json")
}
