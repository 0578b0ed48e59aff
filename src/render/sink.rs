// REFLEX Viz - Visualization Sink
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::layout::Layout;
use crate::error::VizResult;
use std::collections::BTreeMap;

/// One display update for a named region.
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    /// JPEG-compressed image.
    Image { jpeg: Vec<u8>, width: u32, height: u32 },
    Points2D {
        points: Vec<[f32; 2]>,
        class_id: Option<u16>,
        keypoint_ids: Option<Vec<u16>>,
        radius: Option<f32>,
    },
    Points3D { points: Vec<[f32; 3]>, radius: Option<f32> },
    /// Box as `[x, y, width, height]`.
    Box2D([f32; 4]),
    Scalar(f64),
    Markdown(String),
    /// Clear the region and everything below it.
    Clear,
}

impl Visual {
    pub fn points_2d(points: Vec<[f32; 2]>) -> Self {
        Self::Points2D {
            points,
            class_id: None,
            keypoint_ids: None,
            radius: None,
        }
    }

    pub fn points_3d(points: Vec<[f32; 3]>) -> Self {
        Self::Points3D { points, radius: None }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self::Markdown(text.into())
    }}

/// Static, once-per-session configuration handed to the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSetup {
    pub layout: Layout,
    /// 3D regions that need view coordinates.
    pub view_3d: Vec<&'static str>,
}

/// Receives everything the visualizer renders.
pub trait Sink {
    fn setup(&mut self, setup: &SessionSetup) -> VizResult<()>;

    /// Stamp subsequent logs with the frame counter and, when known, the
    /// session time in seconds.
    fn set_time(&mut self, frame: u64, seconds: Option<f64>);

    fn log(&mut self, entity: &str, visual: Visual) -> VizResult<()>;

    fn flush(&mut self) -> VizResult<()> {
        Ok(())
    }
}

/// A logged visual together with the frame it was stamped with.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedVisual {
    pub frame: Option<u64>,
    pub seconds: Option<f64>,
    pub entity: String,
    pub visual: Visual,
}

/// Keeps every update in memory. Backs `--dry-run`.
#[derive(Debug, Default)]
pub struct MemorySink {
    setup: Option<SessionSetup>,
    frame: Option<u64>,
    seconds: Option<f64>,
    frames: Vec<u64>,
    logs: Vec<LoggedVisual>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_setup(&self) -> Option<&SessionSetup> {
        self.setup.as_ref()
    }

    /// Frame counters in the order they were set.
    pub fn frames(&self) -> &[u64] {
        &self.frames
    }

    pub fn logs(&self) -> &[LoggedVisual] {
        &self.logs
    }

    pub fn logs_for<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a LoggedVisual> + 'a {
        self.logs.iter().filter(move |l| l.entity == entity)
    }

    /// Updates for `entity` stamped with `frame`.
    pub fn at_frame<'a>(&'a self, entity: &'a str, frame: u64) -> Vec<&'a Visual> {
        self.logs_for(entity)
            .filter(|l| l.frame == Some(frame))
            .map(|l| &l.visual)
            .collect()
    }

    /// Number of updates per entity, for the dry-run report.
    pub fn counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for log in &self.logs {
            *counts.entry(log.entity.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

impl Sink for MemorySink {
    fn setup(&mut self, setup: &SessionSetup) -> VizResult<()> {
        self.setup = Some(setup.clone());
        Ok(())
    }

    fn set_time(&mut self, frame: u64, seconds: Option<f64>) {
        self.frame = Some(frame);
        self.seconds = seconds;
        self.frames.push(frame);
    }

    fn log(&mut self, entity: &str, visual: Visual) -> VizResult<()> {
        self.logs.push(LoggedVisual {
            frame: self.frame,
            seconds: self.seconds,
            entity: entity.to_string(),
            visual,
        });
        Ok(())
    }
}
