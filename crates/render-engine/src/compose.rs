//! Layered composition of one short video.
//!
//! Input order is fixed: `0` background loop, `1` screenshot, `2` avatar,
//! `3` narration. The video chain is background, then the screenshot card,
//! then the avatar, then the two burned-in caption tracks.

use std::path::{Path, PathBuf};

use reelsmith_common::config::VideoConfig;
use reelsmith_common::error::{AssetKind, ReelsmithError, ReelsmithResult};

use crate::graph::{Filter, FilterGraph, Pad, Stage};

/// Label of the final video stream.
pub const VIDEO_OUTPUT_LABEL: &str = "vout";

/// Input index of the narration track.
pub const NARRATION_INPUT: usize = 3;

/// Media files composed into one video.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionAssets {
    pub background: PathBuf,
    pub screenshot: PathBuf,
    pub avatar: PathBuf,
    pub narration: PathBuf,
}

impl CompositionAssets {
    /// Fail with the first asset that is not on disk.
    pub fn verify(&self) -> ReelsmithResult<()> {
        for (kind, path) in self.entries() {
            if !path.is_file() {
                return Err(ReelsmithError::missing_asset(kind, path));
            }
        }
        Ok(())
    }

    /// Assets in input-index order.
    pub fn entries(&self) -> [(AssetKind, &Path); 4] {
        [
            (AssetKind::Background, self.background.as_path()),
            (AssetKind::Screenshot, self.screenshot.as_path()),
            (AssetKind::Avatar, self.avatar.as_path()),
            (AssetKind::Narration, self.narration.as_path()),
        ]
    }
}

/// The two `.ass` documents burned into the video.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleInputs {
    pub top: PathBuf,
    pub middle: PathBuf,
}

/// One `-i` input with its input-side options.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInput {
    pub kind: AssetKind,
    pub path: PathBuf,
    pub options: Vec<String>,
}

/// Everything needed to invoke the renderer for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    pub inputs: Vec<MediaInput>,
    pub graph: FilterGraph,
    pub duration_secs: f64,
    pub fps: u32,
    pub preset: String,
}

impl CompositionPlan {
    /// Full ffmpeg argument list writing to `output`.
    pub fn ffmpeg_args(&self, output: &Path) -> Vec<String> {
        let duration = format_secs(self.duration_secs);
        let mut args: Vec<String> = ["-hide_banner", "-nostats", "-loglevel", "error"]
            .into_iter()
            .map(String::from)
            .collect();
        args.extend(["-progress".to_string(), "pipe:1".to_string()]);

        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.display().to_string());
        }

        args.push("-filter_complex".to_string());
        args.push(self.graph.render());
        args.extend([
            "-map".to_string(),
            format!("[{VIDEO_OUTPUT_LABEL}]"),
            "-map".to_string(),
            format!("{NARRATION_INPUT}:a"),
        ]);
        args.extend(encoder_args(&self.preset));
        args.extend([
            "-r".to_string(),
            self.fps.to_string(),
            "-t".to_string(),
            duration,
            "-y".to_string(),
            output.display().to_string(),
        ]);
        args
    }
}

fn encoder_args(preset: &str) -> Vec<String> {
    vec![
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        preset.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
    ]
}

/// Seconds in the shortest decimal form ffmpeg accepts (`5`, `12.25`).
fn format_secs(secs: f64) -> String {
    format!("{}", secs.max(0.0))
}

/// Build the composition for one item.
///
/// The screenshot is shown over `[0, screenshot_secs]`. The background clip
/// loops for the whole narration.
pub fn build_composition(
    assets: &CompositionAssets,
    subtitles: &SubtitleInputs,
    video: &VideoConfig,
    duration_secs: f64,
) -> ReelsmithResult<CompositionPlan> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(ReelsmithError::unsupported(format!(
            "narration duration must be positive, got {duration_secs}"
        )));
    }

    let inputs = vec![
        MediaInput {
            kind: AssetKind::Background,
            path: assets.background.clone(),
            options: vec![
                "-stream_loop".to_string(),
                "-1".to_string(),
                "-t".to_string(),
                format_secs(duration_secs),
            ],
        },
        MediaInput {
            kind: AssetKind::Screenshot,
            path: assets.screenshot.clone(),
            options: Vec::new(),
        },
        MediaInput {
            kind: AssetKind::Avatar,
            path: assets.avatar.clone(),
            options: Vec::new(),
        },
        MediaInput {
            kind: AssetKind::Narration,
            path: assets.narration.clone(),
            options: Vec::new(),
        },
    ];

    let (w, h) = (video.width, video.height);
    let mut graph = FilterGraph::new();

    let background = graph.push(
        Stage::new("background")
            .input(Pad::video(0))
            .filter(
                Filter::new("crop")
                    .arg(format!("ih*{w}/{h}"))
                    .arg("ih"),
            )
            .filter(Filter::new("scale").arg(w.to_string()).arg(h.to_string()))
            .filter(Filter::new("setsar").arg("1")),
    )?;

    let screenshot = graph.push(
        Stage::new("screenshot")
            .input(Pad::video(1))
            .filter(Filter::new("scale").arg(w.to_string()).arg("-1"))
            .filter(Filter::new("setpts").arg("PTS-STARTPTS")),
    )?;

    let with_screenshot = graph.push(
        Stage::new("screenshot_overlay")
            .input(background)
            .input(screenshot)
            .filter(
                Filter::new("overlay")
                    .opt("x", "(main_w-overlay_w)/2")
                    .opt("y", "(main_h-overlay_h)/2")
                    .opt(
                        "enable",
                        format!("between(t,0,{})", format_secs(video.screenshot_secs)),
                    ),
            ),
    )?;

    let avatar = graph.push(
        Stage::new("avatar")
            .input(Pad::video(2))
            .filter(
                Filter::new("scale")
                    .arg(video.avatar_width.to_string())
                    .arg("-1"),
            ),
    )?;

    let margin = video.avatar_margin;
    let with_avatar = graph.push(
        Stage::new("avatar_overlay")
            .input(with_screenshot)
            .input(avatar)
            .filter(
                Filter::new("overlay")
                    .opt("x", format!("W-w-{margin}"))
                    .opt("y", format!("H-h-{margin}")),
            ),
    )?;

    let with_top = graph.push(
        Stage::new("top_captions")
            .input(with_avatar)
            .filter(subtitles_filter(&subtitles.top)),
    )?;

    graph.push(
        Stage::new("middle_captions")
            .input(with_top)
            .filter(subtitles_filter(&subtitles.middle))
            .output(VIDEO_OUTPUT_LABEL),
    )?;

    tracing::debug!(
        stages = graph.stages().len(),
        duration_secs,
        graph = %graph.render(),
        "Composition graph built"
    );

    Ok(CompositionPlan {
        inputs,
        graph,
        duration_secs,
        fps: video.fps,
        preset: video.preset.clone(),
    })
}

fn subtitles_filter(path: &Path) -> Filter {
    Filter::new("subtitles").opt("filename", path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> CompositionAssets {
        CompositionAssets {
            background: PathBuf::from("video_assets/background_gameplay.mp4"),
            screenshot: PathBuf::from("shots/tweet_42_a.png"),
            avatar: PathBuf::from("video_assets/peter_avatar.png"),
            narration: PathBuf::from("audio/42_story.mp3"),
        }
    }

    fn subtitles() -> SubtitleInputs {
        SubtitleInputs {
            top: PathBuf::from("/tmp/item/top.ass"),
            middle: PathBuf::from("/tmp/item/middle.ass"),
        }
    }

    fn plan() -> CompositionPlan {
        build_composition(&assets(), &subtitles(), &VideoConfig::default(), 12.5).unwrap()
    }

    #[test]
    fn test_stage_order() {
        let plan = plan();
        let names: Vec<&str> = plan.graph.stages().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "background",
                "screenshot",
                "screenshot_overlay",
                "avatar",
                "avatar_overlay",
                "top_captions",
                "middle_captions",
            ]
        );
        assert_eq!(plan.graph.sinks(), vec![VIDEO_OUTPUT_LABEL]);
    }

    #[test]
    fn test_overlay_chain_feeds_forward() {
        let plan = plan();
        let graph = &plan.graph;
        assert_eq!(
            graph.stage("screenshot_overlay").unwrap().inputs,
            vec![Pad::label("background"), Pad::label("screenshot")]
        );
        assert_eq!(
            graph.stage("avatar_overlay").unwrap().inputs,
            vec![Pad::label("screenshot_overlay"), Pad::label("avatar")]
        );
        assert_eq!(
            graph.stage("top_captions").unwrap().inputs,
            vec![Pad::label("avatar_overlay")]
        );
        assert_eq!(
            graph.stage("middle_captions").unwrap().inputs,
            vec![Pad::label("top_captions")]
        );
    }

    #[test]
    fn test_rendered_graph() {
        let rendered = plan().graph.render();
        let stages: Vec<&str> = rendered.split(';').collect();
        assert_eq!(
            stages,
            vec![
                "[0:v]crop=ih*1080/1920:ih,scale=1080:1920,setsar=1[background]",
                "[1:v]scale=1080:-1,setpts=PTS-STARTPTS[screenshot]",
                "[background][screenshot]overlay=x=(main_w-overlay_w)/2:y=(main_h-overlay_h)/2:enable=between(t\\,0\\,5)[screenshot_overlay]",
                "[2:v]scale=500:-1[avatar]",
                "[screenshot_overlay][avatar]overlay=x=W-w-30:y=H-h-30[avatar_overlay]",
                "[avatar_overlay]subtitles=filename=/tmp/item/top.ass[top_captions]",
                "[top_captions]subtitles=filename=/tmp/item/middle.ass[vout]",
            ]
        );
    }

    #[test]
    fn test_screenshot_window_follows_config() {
        let video = VideoConfig {
            screenshot_secs: 3.5,
            ..VideoConfig::default()
        };
        let plan = build_composition(&assets(), &subtitles(), &video, 10.0).unwrap();
        let overlay = plan
            .graph
            .stage("screenshot_overlay")
            .and_then(|s| s.filter_named("overlay"))
            .unwrap();
        assert_eq!(overlay.option("enable"), Some("between(t,0,3.5)"));
    }

    #[test]
    fn test_ffmpeg_args() {
        let args = plan().ffmpeg_args(Path::new("out/42_story.mp4"));
        let has = |pair: [&str; 2]| args.windows(2).any(|w| w == pair);

        assert!(has(["-progress", "pipe:1"]));
        assert!(has(["-stream_loop", "-1"]));
        assert!(has(["-map", "[vout]"]));
        assert!(has(["-map", "3:a"]));
        assert!(has(["-c:v", "libx264"]));
        assert!(has(["-preset", "ultrafast"]));
        assert!(has(["-c:a", "aac"]));
        assert!(has(["-r", "60"]));
        assert!(has(["-pix_fmt", "yuv420p"]));
        assert!(has(["-t", "12.5"]));
        assert_eq!(args[args.len() - 2], "-y");
        assert_eq!(args.last().map(String::as_str), Some("out/42_story.mp4"));

        let inputs: Vec<&str> = args
            .windows(2)
            .filter(|w| w[0] == "-i")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(
            inputs,
            vec![
                "video_assets/background_gameplay.mp4",
                "shots/tweet_42_a.png",
                "video_assets/peter_avatar.png",
                "audio/42_story.mp3",
            ]
        );
    }

    #[test]
    fn test_subtitle_paths_are_escaped() {
        let subs = SubtitleInputs {
            top: PathBuf::from("/tmp/it's:here/top.ass"),
            middle: PathBuf::from("/tmp/b/middle.ass"),
        };
        let plan = build_composition(&assets(), &subs, &VideoConfig::default(), 5.0).unwrap();
        let top = plan.graph.stage("top_captions").unwrap().to_string();
        assert_eq!(
            top,
            "[avatar_overlay]subtitles=filename=/tmp/it\\\\\\'s\\\\:here/top.ass[top_captions]"
        );
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        for duration in [0.0, -3.0, f64::NAN] {
            let err = build_composition(&assets(), &subtitles(), &VideoConfig::default(), duration)
                .unwrap_err();
            assert!(matches!(err, ReelsmithError::Unsupported { .. }), "{err:?}");
            assert_eq!(err.kind(), "unexpected");
            assert!(err.to_string().contains("duration must be positive"));
        }
    }

    #[test]
    fn test_verify_names_missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let touch = |name: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, b"x").unwrap();
            path
        };
        let assets = CompositionAssets {
            background: touch("bg.mp4"),
            screenshot: touch("shot.png"),
            avatar: dir.path().join("peter_avatar.png"),
            narration: touch("n.mp3"),
        };
        match assets.verify() {
            Err(ReelsmithError::MissingAsset { asset, path }) => {
                assert_eq!(asset, AssetKind::Avatar);
                assert!(path.ends_with("peter_avatar.png"));
            }
            other => panic!("expected missing avatar, got {other:?}"),
        }
    }
}
