// REFLEX Viz - Configuration
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::error::{VizError, VizResult};
use crate::participant::{self, ParticipantCode};
use std::path::PathBuf;

pub const DEFAULT_MAX_FRAMES: u64 = 18_000;
pub const DEFAULT_JPEG_QUALITY: u8 = 15;
pub const DEFAULT_OPENFACE_CONFIDENCE: f64 = 0.7;
pub const DEFAULT_LOG_FILE: &str = "reflex_viz.log";
pub const DEFAULT_VISUALS_DIR: &str = "visuals";

/// Process-wide defaults read from the environment (and `.env`).
///
/// CLI flags take precedence over anything set here.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_root: Option<PathBuf>,
    pub visuals_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: None,
            visuals_dir: PathBuf::from(DEFAULT_VISUALS_DIR),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            data_root: non_empty("REFLEX_DATA_ROOT").map(PathBuf::from),
            visuals_dir: non_empty("REFLEX_VISUALS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.visuals_dir),
            log_file: non_empty("REFLEX_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        }
    }
}

/// Where the rendered session goes.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
    /// Spawn a local viewer and stream into it.
    Spawn,
    /// Write a `.rrd` recording.
    Save(PathBuf),
    /// Keep everything in memory and only report counts.
    DryRun,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationConfig {
    pub participant: ParticipantCode,
    /// Participant folder holding the videos and modality tables.
    pub data_path: PathBuf,
    pub max_frames: u64,
    pub jpeg_quality: u8,
    pub face_3d: bool,
    pub gaze_3d: bool,
    pub body_3d: bool,
    pub openface_confidence: f64,
    pub visuals_dir: PathBuf,
    pub output: OutputTarget,
}

impl VisualizationConfig {
    pub fn new(participant: ParticipantCode, data_path: impl Into<PathBuf>) -> Self {
        Self {
            participant,
            data_path: data_path.into(),
            max_frames: DEFAULT_MAX_FRAMES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            face_3d: false,
            gaze_3d: false,
            body_3d: false,
            openface_confidence: DEFAULT_OPENFACE_CONFIDENCE,
            visuals_dir: PathBuf::from(DEFAULT_VISUALS_DIR),
            output: OutputTarget::Spawn,
        }
    }

    /// Resolve the participant folder from an optional dataset root.
    pub fn resolve(participant: ParticipantCode, dataset_root: Option<PathBuf>) -> VizResult<Self> {
        let root = dataset_root.unwrap_or_else(participant::default_dataset_root);
        let data_path = participant.resolve_folder(&root)?;
        Ok(Self::new(participant, data_path))
    }

    pub fn validate(&self) -> VizResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(VizError::Config(format!(
                "jpeg quality must be within 1-100, got {}",
                self.jpeg_quality
            )));
        }
        if !(0.0..=1.0).contains(&self.openface_confidence) {
            return Err(VizError::Config(format!(
                "openface confidence must be within 0.0-1.0, got {}",
                self.openface_confidence
            )));
        }
        Ok(())
    }

    pub fn primary_video(&self) -> PathBuf {
        self.data_path.join("video_cam1.mp4")
    }

    pub fn secondary_video(&self) -> PathBuf {
        self.data_path.join("video_cam2.mp4")
    }

    pub fn recording_id(&self) -> String {
        format!("Participant-{}", self.participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> VisualizationConfig {
        VisualizationConfig::new("C1-1".parse().unwrap(), "/data/C1-Fixed-Low/C1-1")
    }

    #[test]
    fn test_defaults_match_cli_defaults() {
        let cfg = config();
        assert_eq!(cfg.max_frames, 18_000);
        assert_eq!(cfg.jpeg_quality, 15);
        assert!((cfg.openface_confidence - 0.7).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_quality_and_confidence() {
        let mut cfg = config();
        cfg.jpeg_quality = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.openface_confidence = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_paths_are_under_participant_folder() {
        let cfg = config();
        assert_eq!(cfg.primary_video(), PathBuf::from("/data/C1-Fixed-Low/C1-1/video_cam1.mp4"));
        assert_eq!(cfg.secondary_video(), PathBuf::from("/data/C1-Fixed-Low/C1-1/video_cam2.mp4"));
        assert_eq!(cfg.recording_id(), "Participant-C1-1");
    }

    #[test]
    fn test_settings_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("REFLEX_DATA_ROOT", "/srv/Dataset"),
            ("REFLEX_VISUALS_DIR", ""),
        ]
        .into_iter()
        .collect();
        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.data_root, Some(PathBuf::from("/srv/Dataset")));
        assert_eq!(settings.visuals_dir, PathBuf::from(DEFAULT_VISUALS_DIR));
        assert_eq!(settings.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_resolve_fails_for_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let result = VisualizationConfig::resolve("C3-2".parse().unwrap(), Some(dir.path().to_path_buf()));
        assert!(matches!(result, Err(VizError::ParticipantFolderMissing { .. })));

        std::fs::create_dir_all(dir.path().join("C3-Fixed-High").join("C3-2")).unwrap();
        let cfg = VisualizationConfig::resolve("C3-2".parse().unwrap(), Some(dir.path().to_path_buf())).unwrap();
        assert!(cfg.data_path.ends_with("C3-Fixed-High/C3-2"));
    }
}
