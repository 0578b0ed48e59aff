// REFLEX Viz - FFprobe Video Information
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::error::{VizError, VizResult};
use serde::Deserialize;
use std::path::Path;
use std::process::{Command, Stdio};

/// Video stream information needed to decode raw frames.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Duration in seconds
    pub duration: f64,
    /// Frame count as reported by the container, if any
    pub nb_frames: Option<u64>,
}

impl VideoInfo {
    /// Best-effort total frame count; approximate for variable frame rates.
    pub fn frame_count(&self) -> u64 {
        match self.nb_frames {
            Some(n) if n > 0 => n,
            _ => (self.duration * self.fps).round().max(0.0) as u64,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

/// Probe a video file with ffprobe.
pub fn probe_video(path: &Path) -> VizResult<VideoInfo> {
    if !path.is_file() {
        return Err(VizError::video_open(path, "file not found"));
    }

    which::which("ffprobe").map_err(|_| VizError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    if !output.status.success() {
        return Err(VizError::video_open(
            path,
            format!("ffprobe failed: {}", String::from_utf8_lossy(&output.stderr).trim()),
        ));
    }

    parse_probe_output(&output.stdout).map_err(|reason| VizError::video_open(path, reason))
}

fn parse_probe_output(stdout: &[u8]) -> Result<VideoInfo, String> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout).map_err(|e| e.to_string())?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| "no video stream found".to_string())?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err("video stream has no dimensions".to_string()),
    };

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
        .unwrap_or(30.0);

    let duration = stream
        .duration
        .as_deref()
        .or(probe.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let nb_frames = stream.nb_frames.as_deref().and_then(|n| n.parse::<u64>().ok());

    Ok(VideoInfo {
        width,
        height,
        fps,
        duration,
        nb_frames,
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97"). Zero rates are rejected.
fn parse_frame_rate(s: &str) -> Option<f64> {
    let rate = if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den <= 0.0 {
            return None;
        }
        num / den
    } else {
        s.parse().ok()?
    };
    (rate > 0.0).then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("garbage"), None);
    }

    #[test]
    fn test_parse_probe_output_picks_video_stream() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 640, "height": 360,
                 "avg_frame_rate": "0/0", "r_frame_rate": "25/1", "nb_frames": "250"}
            ],
            "format": {"duration": "10.0"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!((info.width, info.height), (640, 360));
        assert!((info.fps - 25.0).abs() < 1e-9);
        assert_eq!(info.frame_count(), 250);
    }

    #[test]
    fn test_frame_count_falls_back_to_duration() {
        let info = VideoInfo {
            width: 2,
            height: 2,
            fps: 30.0,
            duration: 2.0,
            nb_frames: None,
        };
        assert_eq!(info.frame_count(), 60);
    }

    #[test]
    fn test_parse_probe_output_without_video() {
        let json = br#"{"streams": [{"codec_type": "audio"}]}"#;
        assert!(parse_probe_output(json).is_err());
    }
}
