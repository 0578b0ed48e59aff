// REFLEX Viz - Video Source
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Decodes a video through an `ffmpeg` child process that writes raw rgb24
// frames to stdout. Reading is lazy and strictly sequential.

use super::probe::{probe_video, VideoInfo};
use crate::error::{VizError, VizResult};
use image::RgbImage;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, info, warn};

/// A single decoded frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    /// Presentation time in seconds
    pub time: f64,
    /// Zero-based position in the source at read time
    pub index: u64,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

pub struct VideoSource {
    path: PathBuf,
    info: VideoInfo,
    process: Option<Child>,
    stdout: Option<ChildStdout>,
    next_index: u64,
}

impl VideoSource {
    /// Open `path` for decoding. Fails if the file is missing, unprobeable,
    /// or the decoder cannot be started.
    pub fn open(path: impl AsRef<Path>) -> VizResult<Self> {
        let path = path.as_ref();
        let info = probe_video(path)?;

        which::which("ffmpeg").map_err(|_| VizError::FfmpegNotFound)?;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| VizError::video_open(path, format!("failed to start ffmpeg: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VizError::video_open(path, "ffmpeg stdout unavailable"))?;

        info!(
            "[VIDEO] Opened {:?} ({}x{} @ {:.2} fps, ~{} frames)",
            path,
            info.width,
            info.height,
            info.fps,
            info.frame_count()
        );

        Ok(Self {
            path: path.to_path_buf(),
            info,
            process: Some(child),
            stdout: Some(stdout),
            next_index: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    pub fn frame_count(&self) -> u64 {
        self.info.frame_count()
    }

    pub fn is_open(&self) -> bool {
        self.process.is_some()
    }

    /// Stop the decoder. Calling this more than once is a no-op.
    pub fn close(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.process.take() {
            let _ = child.kill();
            let _ = child.wait();
            debug!("[VIDEO] Released decoder for {:?}", self.path);
        }
    }

    fn read_frame(&mut self) -> Option<Frame> {
        let stdout = self.stdout.as_mut()?;
        let frame_size = self.info.width as usize * self.info.height as usize * 3;
        let mut buffer = vec![0u8; frame_size];

        if let Err(e) = stdout.read_exact(&mut buffer) {
            if e.kind() == ErrorKind::UnexpectedEof {
                debug!("[VIDEO] End of stream for {:?} after {} frames", self.path, self.next_index);
            } else {
                warn!("[VIDEO] Read error on {:?}: {}", self.path, e);
            }
            self.close();
            return None;
        }

        let image = RgbImage::from_raw(self.info.width, self.info.height, buffer)?;
        let index = self.next_index;
        self.next_index += 1;

        Some(Frame {
            image,
            time: index as f64 / self.info.fps,
            index,
        })
    }
}

impl Iterator for VideoSource {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.read_frame()
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_fails() {
        let result = VideoSource::open("/definitely/not/here/video_cam1.mp4");
        assert!(matches!(result, Err(VizError::VideoOpen { .. })));
    }
}
