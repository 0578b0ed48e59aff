// REFLEX Viz - Rerun Sink
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::sink::{SessionSetup, Sink, Visual};
use crate::data::lists::{body_connections, BODY_CLASS_ID, BODY_LANDMARKS};
use crate::error::{VizError, VizResult};
use rerun::{RecordingStream, RecordingStreamBuilder};
use std::path::Path;
use tracing::{debug, info};

const FRAME_TIMELINE: &str = "frame";
const TIME_TIMELINE: &str = "time";

/// Streams the session into a Rerun viewer or an `.rrd` file.
pub struct RerunSink {
    rec: RecordingStream,
}

impl RerunSink {
    /// Spawn a local viewer and stream into it.
    pub fn spawn(app_id: &str) -> VizResult<Self> {
        let rec = RecordingStreamBuilder::new(app_id)
            .spawn()
            .map_err(VizError::sink)?;
        info!("[SINK] Streaming {} to a spawned viewer", app_id);
        Ok(Self { rec })
    }

    /// Record to an `.rrd` file for later viewing.
    pub fn save(app_id: &str, path: &Path) -> VizResult<Self> {
        let rec = RecordingStreamBuilder::new(app_id)
            .save(path)
            .map_err(VizError::sink)?;
        info!("[SINK] Recording {} to {:?}", app_id, path);
        Ok(Self { rec })
    }

    fn skeleton() -> rerun::AnnotationContext {
        use rerun::datatypes::{AnnotationInfo, ClassDescription};

        let class = ClassDescription {
            info: AnnotationInfo {
                id: BODY_CLASS_ID,
                label: None,
                color: None,
            },
            keypoint_annotations: BODY_LANDMARKS
                .iter()
                .map(|&(id, name)| AnnotationInfo {
                    id,
                    label: Some(name.into()),
                    color: None,
                })
                .collect(),
            keypoint_connections: body_connections().into_iter().map(Into::into).collect(),
        };
        rerun::AnnotationContext::new([class])
    }
}

impl Sink for RerunSink {
    fn setup(&mut self, setup: &SessionSetup) -> VizResult<()> {
        for origin in &setup.view_3d {
            self.rec
                .log_static(*origin, &rerun::ViewCoordinates::RIGHT_HAND_Y_DOWN())
                .map_err(VizError::sink)?;
        }
        self.rec
            .log_static("/", &Self::skeleton())
            .map_err(VizError::sink)?;

        for panel in &setup.layout.panels {
            debug!(
                "[SINK] Panel {} <- {} ({:?}, {:?} column)",
                panel.name, panel.origin, panel.kind, panel.column
            );
        }
        Ok(())
    }

    fn set_time(&mut self, frame: u64, seconds: Option<f64>) {
        self.rec.set_time_sequence(FRAME_TIMELINE, frame as i64);
        match seconds {
            Some(secs) => self.rec.set_duration_secs(TIME_TIMELINE, secs),
            None => self.rec.disable_timeline(TIME_TIMELINE),
        }
    }

    fn log(&mut self, entity: &str, visual: Visual) -> VizResult<()> {
        let result = match visual {
            Visual::Image { jpeg, .. } => self
                .rec
                .log(entity, &rerun::EncodedImage::from_file_contents(jpeg)),
            Visual::Points2D {
                points,
                class_id,
                keypoint_ids,
                radius,
            } => {
                let mut archetype = rerun::Points2D::new(points);
                if let Some(class_id) = class_id {
                    archetype = archetype.with_class_ids([class_id]);
                }
                if let Some(ids) = keypoint_ids {
                    archetype = archetype.with_keypoint_ids(ids);
                }
                if let Some(radius) = radius {
                    archetype = archetype.with_radii([radius]);
                }
                self.rec.log(entity, &archetype)
            }
            Visual::Points3D { points, radius } => {
                let mut archetype = rerun::Points3D::new(points);
                if let Some(radius) = radius {
                    archetype = archetype.with_radii([radius]);
                }
                self.rec.log(entity, &archetype)
            }
            Visual::Box2D([x, y, w, h]) => self
                .rec
                .log(entity, &rerun::Boxes2D::from_mins_and_sizes([[x, y]], [[w, h]])),
            Visual::Scalar(value) => self.rec.log(entity, &rerun::Scalars::new([value])),
            Visual::Markdown(text) => self.rec.log(
                entity,
                &rerun::TextDocument::new(text).with_media_type(rerun::MediaType::markdown()),
            ),
            Visual::Clear => self.rec.log(entity, &rerun::Clear::recursive()),
        };
        result.map_err(VizError::sink)
    }

    fn flush(&mut self) -> VizResult<()> {
        self.rec.flush_blocking();
        Ok(())
    }
}
