//! Error types shared across Reelsmith crates.

use std::fmt;
use std::path::PathBuf;

/// External asset an item needs before it can be composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Screenshot,
    Background,
    Avatar,
    Narration,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Screenshot => "screenshot",
            AssetKind::Background => "background",
            AssetKind::Avatar => "avatar",
            AssetKind::Narration => "narration",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for Reelsmith operations.
#[derive(Debug, thiserror::Error)]
pub enum ReelsmithError {
    #[error("Missing {asset} asset: {}", .path.display())]
    MissingAsset { asset: AssetKind, path: PathBuf },

    #[error("Transcription produced no words for {}", .audio.display())]
    EmptyTranscript { audio: PathBuf },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    #[error("Render failed ({status})\nstdout: {stdout}\nstderr: {stderr}")]
    Render {
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("Caption error: {message}")]
    Caption { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ReelsmithError.
pub type ReelsmithResult<T> = Result<T, ReelsmithError>;

impl ReelsmithError {
    pub fn missing_asset(asset: AssetKind, path: impl Into<PathBuf>) -> Self {
        Self::MissingAsset {
            asset,
            path: path.into(),
        }
    }

    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription {
            message: msg.into(),
        }
    }

    /// Render failure without captured process output (spawn errors, etc.).
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            status: "not started".to_string(),
            stdout: String::new(),
            stderr: msg.into(),
        }
    }

    pub fn caption(msg: impl Into<String>) -> Self {
        Self::Caption {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Short stable label used in per-item log lines and batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ReelsmithError::MissingAsset { .. } => "input-missing",
            ReelsmithError::EmptyTranscript { .. } => "transcription-empty",
            ReelsmithError::Render { .. } => "render-failure",
            _ => "unexpected",
        }
    }
}
