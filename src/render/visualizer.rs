// REFLEX Viz - Session Visualizer
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Drives one participant session: pulls primary frames, keeps the second
// camera in step, and for every frame renders each modality into the sink.

use super::image_cache::{encode_jpeg, ImageCache, EMPTY_IMAGE};
use super::layout::{entity, Layout};
use super::modalities::{
    resolve_affect, resolve_body, resolve_face_gaze, resolve_gaze_target, resolve_hume, Emission,
    OverlayOptions,
};
use super::sink::{SessionSetup, Sink, Visual};
use crate::config::VisualizationConfig;
use crate::cursor::{CursorState, WindowCursor};
use crate::data::{FailurePhase, SessionData, SpeechSegment};
use crate::error::VizResult;
use crate::video::{synchronized_frame, Frame, VideoSource};
use image::RgbImage;
use tracing::{debug, info, warn};

/// JPEG quality for the failure description while a phase is active.
pub const ACTIVE_FAILURE_QUALITY: u8 = 20;
/// JPEG quality for the idle placeholder.
pub const IDLE_FAILURE_QUALITY: u8 = 15;
pub const NO_FAILURE: &str = "# No Failure";

const PROGRESS_EVERY: u64 = 900;

/// Frame counter as shown on the timeline: the decoder's zero-based index
/// plus one.
pub fn adjusted_index(raw_index: u64) -> u64 {
    raw_index + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Dual,
    SingleCamera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub mode: CameraMode,
    pub frames: u64,
    pub last_index: Option<u64>,
}

fn image_visual(image: &RgbImage, quality: u8) -> VizResult<Visual> {
    Ok(Visual::Image {
        jpeg: encode_jpeg(image, quality)?,
        width: image.width(),
        height: image.height(),
    })
}

pub struct Visualizer<S: Sink> {
    config: VisualizationConfig,
    options: OverlayOptions,
    data: SessionData,
    failures: WindowCursor<FailurePhase>,
    /// `None` when the participant has no usable transcript.
    speech: Option<WindowCursor<SpeechSegment>>,
    images: ImageCache,
    sink: S,
}

impl<S: Sink> Visualizer<S> {
    /// Load the participant's modality tables and prepare a session.
    pub fn new(config: VisualizationConfig, sink: S) -> Self {
        info!("[VIZ] Loading session data from {:?}", config.data_path);
        let data = SessionData::load(&config.data_path);
        Self::with_data(config, data, sink)
    }

    pub fn with_data(config: VisualizationConfig, data: SessionData, sink: S) -> Self {
        let failures = WindowCursor::new(data.analysis.as_present().cloned().unwrap_or_default());
        let speech = data.speech.as_present().cloned().map(WindowCursor::new);

        Self {
            options: OverlayOptions::from(&config),
            images: ImageCache::new(&config.visuals_dir),
            config,
            data,
            failures,
            speech,
            sink,
        }
    }

    pub fn image_cache(&self) -> &ImageCache {
        &self.images
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Open the participant's videos and render the session.
    pub fn run(&mut self) -> VizResult<SessionSummary> {
        let primary = VideoSource::open(self.config.primary_video())?;
        info!(
            "[VIZ] Primary camera: {}x{} @ {:.2} fps, ~{} frames",
            primary.info().width,
            primary.info().height,
            primary.info().fps,
            primary.frame_count()
        );

        let secondary_path = self.config.secondary_video();
        let secondary = if secondary_path.is_file() {
            match VideoSource::open(&secondary_path) {
                Ok(source) => Some(source),
                Err(e) => {
                    warn!("[VIZ] Second camera unusable: {}", e);
                    None
                }
            }
        } else {
            warn!("[VIZ] No second camera at {:?}", secondary_path);
            None
        };

        self.run_streams(primary, secondary)
    }

    /// Render frames from already-open streams until the primary runs out or
    /// the frame limit is passed.
    pub fn run_streams<P, Q>(&mut self, primary: P, secondary: Option<Q>) -> VizResult<SessionSummary>
    where
        P: IntoIterator<Item = Frame>,
        Q: Iterator<Item = Frame>,
    {
        let mode = if secondary.is_some() {
            CameraMode::Dual
        } else {
            info!("[VIZ] Processing with single camera mode");
            CameraMode::SingleCamera
        };
        self.sink.setup(&self.session_setup(mode))?;

        let mut secondary = secondary;
        let mut summary = SessionSummary {
            mode,
            frames: 0,
            last_index: None,
        };

        for frame in primary {
            let index = adjusted_index(frame.index);
            if index > self.config.max_frames {
                debug!("[VIZ] Frame limit {} reached", self.config.max_frames);
                break;
            }

            let cam2 = secondary
                .as_mut()
                .and_then(|stream| synchronized_frame(stream, index));
            self.log_frame(index, &frame, cam2.as_ref())?;

            summary.frames += 1;
            summary.last_index = Some(index);
            if index % PROGRESS_EVERY == 0 {
                info!("[VIZ] Rendered {} frames", index);
            }
        }

        self.sink.flush()?;
        info!(
            "[VIZ] Session {} done: {} frames ({:?})",
            self.config.participant, summary.frames, summary.mode
        );
        Ok(summary)
    }

    fn session_setup(&self, mode: CameraMode) -> SessionSetup {
        let layout = match mode {
            CameraMode::Dual => Layout::dual_camera(),
            CameraMode::SingleCamera => Layout::single_camera(),
        };
        let view_3d = layout
            .spatial_3d()
            .map(|panel| panel.origin)
            .filter(|&origin| match origin {
                entity::FACE_3D => self.options.face_3d,
                entity::BODY_3D => self.options.body_3d,
                _ => false,
            })
            .collect();
        SessionSetup { layout, view_3d }
    }

    /// Render everything for one (adjusted) frame index.
    pub fn log_frame(&mut self, index: u64, primary: &Frame, secondary: Option<&Frame>) -> VizResult<()> {
        let key = index as i64;
        let seconds = self
            .data
            .times
            .as_present()
            .and_then(|t| t.seconds(key))
            .filter(|s| *s >= 0.0);
        if seconds.is_none() {
            debug!("[VIZ] No timestamp for frame {}", index);
        }
        self.sink.set_time(index, seconds);

        let quality = self.config.jpeg_quality;
        self.sink.log(entity::VIDEO_IMAGE, image_visual(&primary.image, quality)?)?;
        if let Some(frame) = secondary {
            self.sink.log(entity::CAM2_IMAGE, image_visual(&frame.image, quality)?)?;
        }

        self.log_failure(key)?;
        self.log_transcript(seconds)?;

        let opts = self.options;
        let mut emissions: Vec<Emission> = Vec::new();
        if let Some(openface) = self.data.openface.as_present() {
            emissions.extend(resolve_face_gaze(openface, key, &opts).emissions(&opts));
        }
        if let Some(gaze) = self.data.gaze.as_present() {
            emissions.push(resolve_gaze_target(gaze, key).emission());
        }
        if let Some(body) = self.data.body.as_present() {
            let pose = resolve_body(body, key, primary.width(), primary.height(), &opts);
            emissions.extend(pose.emissions(&opts));
        }
        if let Some(facetorch) = self.data.facetorch.as_present() {
            emissions.extend(resolve_affect(facetorch, key).emissions());
        }
        if let Some(hume) = self.data.hume.as_present() {
            emissions.extend(resolve_hume(hume, key).emissions());
        }

        for emission in emissions {
            self.sink.log(&emission.entity, emission.visual)?;
        }
        Ok(())
    }

    fn log_failure(&mut self, frame: i64) -> VizResult<()> {
        let (headline, stem, quality) = match self.failures.advance(frame) {
            CursorState::Active(phase) => (phase.headline(), phase.image_stem(), ACTIVE_FAILURE_QUALITY),
            CursorState::Inactive | CursorState::Exhausted => {
                (NO_FAILURE.to_string(), EMPTY_IMAGE.to_string(), IDLE_FAILURE_QUALITY)
            }
        };

        self.sink.log(entity::FAILURE, Visual::Markdown(headline))?;
        if let Some(overlay) = self.images.overlay(&stem) {
            self.sink.log(entity::DESCRIPTION, image_visual(overlay, quality)?)?;
        }
        Ok(())
    }

    fn log_transcript(&mut self, seconds: Option<f64>) -> VizResult<()> {
        let (Some(seconds), Some(cursor)) = (seconds, self.speech.as_mut()) else {
            return Ok(());
        };

        match cursor.advance(seconds) {
            CursorState::Active(segment) => {
                self.sink.log(entity::TRANSCRIPT, Visual::Markdown(segment.caption()))?;
                for &(name, score) in &segment.emotions {
                    self.sink
                        .log(&format!("{}/{}", entity::SPEECH, name), Visual::Scalar(score))?;
                }
            }
            CursorState::Inactive | CursorState::Exhausted => {
                self.sink.log(entity::TRANSCRIPT, Visual::Clear)?;
                self.sink.log(entity::SPEECH, Visual::Clear)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ModalityTable, Table, TimeMap};
    use crate::render::sink::MemorySink;

    fn visualizer(config: VisualizationConfig) -> Visualizer<MemorySink> {
        Visualizer::with_data(config, SessionData::default(), MemorySink::new())
    }

    #[test]
    fn test_adjusted_index() {
        assert_eq!(adjusted_index(0), 1);
        assert_eq!(adjusted_index(41), 42);
    }

    #[test]
    fn test_setup_lists_enabled_3d_views() {
        let mut config = VisualizationConfig::new("D1-3".parse().unwrap(), "/nowhere");
        config.body_3d = true;
        let viz = visualizer(config);

        let setup = viz.session_setup(CameraMode::SingleCamera);
        assert_eq!(setup.view_3d, vec![entity::BODY_3D]);
        assert!(setup.layout.panel(entity::CAM2).is_none());
    }

    #[test]
    fn test_setup_without_3d_has_no_views() {
        let viz = visualizer(VisualizationConfig::new("D1-3".parse().unwrap(), "/nowhere"));
        assert!(viz.session_setup(CameraMode::Dual).view_3d.is_empty());
    }

    #[test]
    fn test_no_failure_without_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VisualizationConfig::new("C2-4".parse().unwrap(), "/nowhere");
        config.visuals_dir = dir.path().to_path_buf();
        let mut viz = visualizer(config);
        viz.log_failure(10).unwrap();

        let logged: Vec<_> = viz.sink().logs_for(entity::FAILURE).map(|l| &l.visual).collect();
        assert_eq!(logged, vec![&Visual::markdown(NO_FAILURE)]);
        // No visuals directory: placeholder skipped.
        assert_eq!(viz.sink().logs_for(entity::DESCRIPTION).count(), 0);
    }

    #[test]
    fn test_negative_seconds_are_not_session_time() {
        let times = Table::from_reader("Frame,Seconds\n1,-1.0\n2,0.5\n".as_bytes()).unwrap();
        let data = SessionData {
            times: ModalityTable::Present(TimeMap::from_table(&times).unwrap()),
            speech: ModalityTable::Present(vec![SpeechSegment {
                speaker: "Participant".to_string(),
                text: "Hello".to_string(),
                begin: 0.0,
                end: 1.0,
                emotions: vec![("Awe", 0.4)],
            }]),
            ..SessionData::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let mut config = VisualizationConfig::new("C2-4".parse().unwrap(), "/nowhere");
        config.visuals_dir = dir.path().to_path_buf();
        let mut viz = Visualizer::with_data(config, data, MemorySink::new());

        let frame = Frame {
            image: RgbImage::new(4, 4),
            time: 0.0,
            index: 0,
        };
        viz.log_frame(1, &frame, None).unwrap();
        viz.log_frame(2, &frame, None).unwrap();

        let sink = viz.sink();
        assert!(sink.at_frame(entity::TRANSCRIPT, 1).is_empty());
        assert_eq!(
            sink.at_frame(entity::TRANSCRIPT, 2),
            vec![&Visual::markdown("### Hello \n (Participant)")]
        );
        let stamps: Vec<_> = sink.logs_for(entity::VIDEO_IMAGE).map(|l| l.seconds).collect();
        assert_eq!(stamps, vec![None, Some(0.5)]);
    }
}
