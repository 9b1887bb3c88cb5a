//! Write caption tracks for an existing transcript.

use std::path::{Path, PathBuf};

use reelsmith_captions::word::validate_words;
use reelsmith_captions::{CaptionTracks, Track, Word};
use reelsmith_common::config::AppConfig;
use reelsmith_transcribe::parse_whisper_json;

pub fn run(
    config: &AppConfig,
    words_path: PathBuf,
    out_dir: PathBuf,
    boundary: Option<f64>,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&words_path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", words_path.display()))?;
    let words = parse_words(&content)?;
    validate_words(&words)?;

    let boundary = boundary.unwrap_or(config.video.screenshot_secs);
    if !boundary.is_finite() || boundary < 0.0 {
        anyhow::bail!("Boundary must be a non-negative number of seconds, got {boundary}");
    }

    let tracks = CaptionTracks::build(&words, &config.captions, boundary);
    std::fs::create_dir_all(&out_dir)?;

    println!("Captions for {} ({} words)", words_path.display(), words.len());
    for track in [Track::Top, Track::Middle] {
        let doc = tracks.get(track);
        let path = track_path(&out_dir, track);
        doc.write_to(&path)?;
        println!(
            "  {:<6} {} ({} events)",
            track.as_str(),
            path.display(),
            doc.events.len()
        );
    }

    Ok(())
}

fn track_path(dir: &Path, track: Track) -> PathBuf {
    dir.join(format!("{}.ass", track.as_str()))
}

/// Whisper output object, or a bare array of words.
fn parse_words(content: &str) -> anyhow::Result<Vec<Word>> {
    if content.trim_start().starts_with('[') {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(parse_whisper_json(content)?)
    }
}
