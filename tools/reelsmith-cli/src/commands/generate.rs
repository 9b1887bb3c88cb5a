//! Run the batch.

use std::io::Write;

use reelsmith_common::config::AppConfig;
use reelsmith_pipeline::Pipeline;
use reelsmith_render_engine::{FfmpegBackend, RenderBackend, RenderProgress};
use reelsmith_transcribe::{TranscriptionConfig, WhisperCli};

pub fn run(config: AppConfig, limit: Option<usize>) -> anyhow::Result<()> {
    println!("Generating videos");
    println!("  Audio:       {}", config.paths.audio_dir.display());
    println!("  Screenshots: {}", config.paths.screenshot_dir.display());
    println!("  Output:      {}", config.paths.output_dir.display());
    if let Some(limit) = limit {
        println!("  Limit:       {limit}");
    }

    let backend = FfmpegBackend::new().with_progress(Box::new(|p: RenderProgress| {
        print!(
            "\r  Progress: {:.1}% ({:.1}s, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.out_time_secs,
            p.eta_secs,
        );
        let _ = std::io::stdout().flush();
    }));
    if !backend.is_available() {
        anyhow::bail!("ffmpeg and ffprobe must be on PATH (run `reelsmith check`)");
    }

    let transcription = TranscriptionConfig::from_settings(&config.transcription)?;
    let transcriber = WhisperCli::load(transcription)?;

    let mut pipeline = Pipeline::new(config, Box::new(transcriber), Box::new(backend));
    let report = pipeline.run_batch(limit)?;

    println!();
    println!("{}", "=".repeat(50));
    println!(
        "Discovered {} | rendered {} | skipped {} | failed {} ({:.1}s)",
        report.discovered,
        report.rendered,
        report.skipped,
        report.failed.len(),
        report.elapsed_secs()
    );
    for failure in &report.failed {
        println!("  [FAIL] {} ({}): {}", failure.item, failure.kind, failure.message);
    }

    Ok(())
}
