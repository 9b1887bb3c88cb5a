//! Render backends and the ffmpeg runner.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};

use reelsmith_common::error::{ReelsmithError, ReelsmithResult};
use reelsmith_common::process::{command_exists, lossy_output};

use crate::compose::CompositionPlan;

/// Progress callback for rendering.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send>;

/// Render progress report.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Output timestamp reached so far.
    pub out_time_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    pub stage: RenderStage,
}

/// Stages of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Rendering,
    Finalizing,
    Complete,
}

/// Trait for render backends.
pub trait RenderBackend: Send {
    /// Execute the plan, writing the video to `output`.
    fn render(&mut self, plan: &CompositionPlan, output: &Path) -> ReelsmithResult<()>;

    /// Duration of a media file in seconds.
    fn probe_duration(&self, media: &Path) -> ReelsmithResult<f64>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Renders through the `ffmpeg` binary and probes with `ffprobe`.
#[derive(Default)]
pub struct FfmpegBackend {
    progress: Option<ProgressCallback>,
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report progress while rendering.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    fn run_ffmpeg(&self, plan: &CompositionPlan, output: &Path) -> ReelsmithResult<()> {
        let args = plan.ffmpeg_args(output);
        tracing::debug!(args = ?args, "Running ffmpeg");
        let mut cmd = Command::new("ffmpeg");
        cmd.args(&args).stdout(Stdio::piped()).stderr(Stdio::piped());

        let start = std::time::Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| ReelsmithError::render(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(
            pid = child.id(),
            args_len = args.len(),
            duration_secs = plan.duration_secs,
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelsmithError::render("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelsmithError::render("Failed to capture ffmpeg stderr"))?;

        // Drain stderr concurrently so ffmpeg never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut stdout_log = String::new();

        let mut latest_progress = ProgressState::default();
        let mut last_progress_secs = 0.0f64;
        let mut last_progress_wall = std::time::Instant::now();
        loop {
            line.clear();
            let bytes = reader.read_line(&mut line).map_err(|e| {
                ReelsmithError::render(format!("Failed reading ffmpeg progress: {e}"))
            })?;
            if bytes == 0 {
                break;
            }
            stdout_log.push_str(&line);

            let trimmed = line.trim();
            let Some((key, value)) = trimmed.split_once('=') else {
                continue;
            };
            latest_progress.update(key, value);
            if key != "progress" {
                continue;
            }

            if latest_progress.out_time_secs > last_progress_secs + 0.001 {
                last_progress_secs = latest_progress.out_time_secs;
                last_progress_wall = std::time::Instant::now();
            }
            let report = progress_report(
                &latest_progress,
                plan.duration_secs,
                start.elapsed().as_secs_f64(),
            );
            tracing::debug!(
                progress = report.progress,
                out_time_secs = report.out_time_secs,
                eta_secs = report.eta_secs,
                "ffmpeg progress"
            );
            if let Some(cb) = &self.progress {
                cb(report);
            }
            if last_progress_wall.elapsed().as_secs() >= 10 {
                tracing::warn!(
                    out_time_secs = latest_progress.out_time_secs,
                    elapsed_secs = start.elapsed().as_secs_f64(),
                    "No ffmpeg progress advancement for 10s"
                );
                last_progress_wall = std::time::Instant::now();
            }
        }

        let status = child
            .wait()
            .map_err(|e| ReelsmithError::render(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(ReelsmithError::Render {
                status: status.to_string(),
                stdout: stdout_log,
                stderr: stderr_output,
            });
        }
        if !stderr_output.trim().is_empty() {
            tracing::warn!(stderr = %stderr_output.trim(), "ffmpeg reported diagnostics");
        }

        if let Some(cb) = &self.progress {
            cb(RenderProgress {
                progress: 1.0,
                out_time_secs: plan.duration_secs,
                eta_secs: 0.0,
                stage: RenderStage::Complete,
            });
        }

        tracing::info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            output = %output.display(),
            "Render finished"
        );
        Ok(())
    }
}

impl RenderBackend for FfmpegBackend {
    fn render(&mut self, plan: &CompositionPlan, output: &Path) -> ReelsmithResult<()> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.run_ffmpeg(plan, output)
    }

    fn probe_duration(&self, media: &Path) -> ReelsmithResult<f64> {
        probe_duration(media)
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg") && command_exists("ffprobe")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Container duration reported by `ffprobe`.
pub fn probe_duration(path: &Path) -> ReelsmithResult<f64> {
    if !path.exists() {
        return Err(ReelsmithError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelsmithError::render(format!("Failed to start ffprobe: {e}")))?;

    if !output.status.success() {
        return Err(ReelsmithError::Render {
            status: output.status.to_string(),
            stdout: lossy_output(&output.stdout),
            stderr: lossy_output(&output.stderr),
        });
    }

    let raw = lossy_output(&output.stdout);
    let duration = parse_probe_duration(&raw).ok_or_else(|| {
        ReelsmithError::render(format!(
            "ffprobe returned no usable duration for {}: {raw:?}",
            path.display()
        ))
    })?;
    tracing::debug!(path = %path.display(), duration_secs = duration, "Probed duration");
    Ok(duration)
}

/// First positive finite number in ffprobe's `nokey` output.
fn parse_probe_duration(raw: &str) -> Option<f64> {
    raw.lines()
        .filter_map(|line| line.trim().parse::<f64>().ok())
        .find(|secs| secs.is_finite() && *secs > 0.0)
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> RenderProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    RenderProgress {
        progress: if state.complete { 1.0 } else { progress },
        out_time_secs: state.out_time_secs,
        eta_secs,
        stage: if state.complete {
            RenderStage::Finalizing
        } else {
            RenderStage::Rendering
        },
    }
}
