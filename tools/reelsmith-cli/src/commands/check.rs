//! Check external tools and configured paths.

use std::path::Path;

use reelsmith_common::config::{config_file_path, AppConfig};
use reelsmith_common::process::command_exists;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Reelsmith System Check");
    println!("{}", "=".repeat(50));

    let whisper = config.transcription.executable.as_str();
    let mut all_required_ok = true;
    for (label, binary) in [("ffmpeg", "ffmpeg"), ("ffprobe", "ffprobe"), ("whisper", whisper)] {
        if command_exists(binary) || Path::new(binary).is_file() {
            println!("[OK] {label}: {binary}");
        } else {
            all_required_ok = false;
            println!("[MISSING] {label}: {binary}");
        }
    }

    println!();
    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else {
        println!("[INFO] Config: {} (not found, using defaults)", config_path.display());
    }

    let paths = &config.paths;
    let background = paths.background_path();
    let avatar = paths.avatar_path();
    let locations = [
        ("Audio", paths.audio_dir.as_path()),
        ("Screenshots", paths.screenshot_dir.as_path()),
        ("Background", background.as_path()),
        ("Avatar", avatar.as_path()),
    ];
    for (label, path) in locations {
        let status = if path.exists() { "OK" } else { "WARN" };
        println!("[{status}] {label}: {}", path.display());
    }

    println!();
    if all_required_ok {
        println!("All required tools are available. Reelsmith is ready.");
    } else {
        println!("Some required tools are missing. Install them and re-run the check.");
    }

    Ok(())
}
