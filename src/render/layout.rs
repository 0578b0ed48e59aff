// REFLEX Viz - Panel Layout
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Declarative arrangement of the display. Left column: visual
// representation (second camera / 3D scenes, failure status). Right column:
// primary camera, classifications, time series.

/// Entity paths written by the visualizer.
pub mod entity {
    pub const VIDEO: &str = "video";
    pub const VIDEO_IMAGE: &str = "video/image";
    pub const VIDEO_FACE: &str = "video/face";
    pub const VIDEO_GAZE: &str = "video/gaze";
    pub const VIDEO_BODY: &str = "video/body";
    pub const VIDEO_BOX: &str = "video/box";
    pub const CAM2: &str = "cam2";
    pub const CAM2_IMAGE: &str = "cam2/image";
    pub const FACE_3D: &str = "Face3D";
    pub const GAZE_3D: &str = "Gaze3D";
    pub const BODY_3D: &str = "Body3D";
    pub const FAILURE: &str = "Failure";
    pub const DESCRIPTION: &str = "description";
    pub const TRANSCRIPT: &str = "Transcript";
    pub const SPEECH: &str = "Speech";
    pub const BODY_LABEL: &str = "body";
    pub const GAZE_LABEL: &str = "Gaze";
    pub const AFFECT: &str = "Affect";
    pub const AFFECT_VALENCE: &str = "Affect/Valence";
    pub const AFFECT_AROUSAL: &str = "Affect/Arousal";
    pub const POSITIVE: &str = "Positive";
    pub const NEGATIVE: &str = "Negative";
    pub const AUS: &str = "AUs";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Spatial2D,
    Spatial3D,
    Text,
    TimeSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Visual,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub name: &'static str,
    pub origin: &'static str,
    pub kind: PanelKind,
    pub column: Column,
}

const fn panel(name: &'static str, origin: &'static str, kind: PanelKind, column: Column) -> Panel {
    Panel {
        name,
        origin,
        kind,
        column,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub panels: Vec<Panel>,
}

impl Layout {
    /// Layout with both cameras.
    pub fn dual_camera() -> Self {
        let mut panels = vec![panel("Cam2", entity::CAM2, PanelKind::Spatial2D, Column::Visual)];
        panels.extend(Self::shared_panels());
        Self { panels }
    }

    /// Layout without the second camera panel.
    pub fn single_camera() -> Self {
        Self {
            panels: Self::shared_panels(),
        }
    }

    fn shared_panels() -> Vec<Panel> {
        use entity::*;
        use Column::*;
        use PanelKind::*;

        vec![
            panel("Body3D", BODY_3D, Spatial3D, Visual),
            panel("Face3D", FACE_3D, Spatial3D, Visual),
            panel("Failure Description", DESCRIPTION, Spatial2D, Visual),
            panel("Failure Status", FAILURE, Text, Visual),
            panel("Cam1", VIDEO, Spatial2D, Data),
            panel("Transcript", TRANSCRIPT, Text, Data),
            panel("Body Classification", BODY_LABEL, Text, Data),
            panel("Gaze Classification", GAZE_LABEL, Text, Data),
            panel("Affect State", AFFECT, TimeSeries, Data),
            panel("Positive Emotions", POSITIVE, TimeSeries, Data),
            panel("Negative Emotions", NEGATIVE, TimeSeries, Data),
            panel("AUs", AUS, TimeSeries, Data),
            panel("Speech Prosody", SPEECH, TimeSeries, Data),
        ]
    }

    pub fn panel(&self, origin: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.origin == origin)
    }

    pub fn spatial_3d(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(|p| p.kind == PanelKind::Spatial3D)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_camera_drops_cam2() {
        assert!(Layout::dual_camera().panel(entity::CAM2).is_some());
        assert!(Layout::single_camera().panel(entity::CAM2).is_none());
        assert_eq!(
            Layout::dual_camera().panels.len(),
            Layout::single_camera().panels.len() + 1
        );
    }

    #[test]
    fn test_3d_panels() {
        let origins: Vec<_> = Layout::single_camera().spatial_3d().map(|p| p.origin).collect();
        assert_eq!(origins, vec![entity::BODY_3D, entity::FACE_3D]);
    }
}
