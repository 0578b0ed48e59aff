// REFLEX Viz - Participant Data
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Every modality file is optional. Anything missing or unreadable becomes
// `ModalityTable::Absent` with a warning, and the session carries on.

pub mod lists;
pub mod records;
pub mod table;

pub use records::{FailurePhase, SpeechSegment, TimeMap};
pub use table::{FrameTable, Row, Table};

use crate::error::VizError;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A modality that was either loaded or is unavailable for this participant.
#[derive(Debug, Clone, Default)]
pub enum ModalityTable<T> {
    Present(T),
    #[default]
    Absent,
}

impl<T> ModalityTable<T> {
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Self::Present(t) => Some(t),
            Self::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

/// Frame-key column per modality file.
pub const OPENFACE_KEY: &str = "frame";
pub const GAZE_KEY: &str = "Frame";
pub const BODY_KEY: &str = "Frame";
pub const HUME_KEY: &str = "Frame";
pub const FACETORCH_KEY: &str = "Frame ID";

/// Everything loaded for one participant. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub analysis: ModalityTable<Vec<FailurePhase>>,
    pub times: ModalityTable<TimeMap>,
    pub openface: ModalityTable<FrameTable>,
    pub speech: ModalityTable<Vec<SpeechSegment>>,
    pub gaze: ModalityTable<FrameTable>,
    pub body: ModalityTable<FrameTable>,
    pub hume: ModalityTable<FrameTable>,
    pub facetorch: ModalityTable<FrameTable>,
}

impl SessionData {
    /// Load every modality file found in `folder`.
    pub fn load(folder: &Path) -> Self {
        let analysis = load_modality("analysis", &table_path(folder, "analysis"), |path| {
            FailurePhase::from_table(&Table::from_path(path)?).map_err(|e| VizError::table(path, e))
        });

        let times = load_modality("time", &table_path(folder, "time"), |path| {
            TimeMap::from_table(&Table::from_path(path)?).map_err(|e| VizError::table(path, e))
        });

        let speech = load_modality("speech", &table_path(folder, "speech"), |path| {
            SpeechSegment::from_table(&Table::from_path(path)?).map_err(|e| VizError::table(path, e))
        });

        let data = Self {
            analysis,
            times,
            openface: load_frame_table("openface", &table_path(folder, "openface"), OPENFACE_KEY),
            speech,
            gaze: load_frame_table("gaze", &table_path(folder, "gaze"), GAZE_KEY),
            body: load_frame_table("body", &table_path(folder, "body"), BODY_KEY),
            hume: load_frame_table("hume", &table_path(folder, "hume"), HUME_KEY),
            facetorch: load_frame_table("facetorch", &table_path(folder, "facetorch"), FACETORCH_KEY),
        };

        info!(
            "[DATA] Loaded {} failure phases, {} speech segments, {} timed frames",
            data.analysis.as_present().map_or(0, Vec::len),
            data.speech.as_present().map_or(0, Vec::len),
            data.times.as_present().map_or(0, TimeMap::len),
        );
        data
    }
}

/// `<folder>/<name>.csv`
pub fn table_path(folder: &Path, name: &str) -> PathBuf {
    folder.join(format!("{}.csv", name))
}

fn load_modality<T, E: Display>(
    name: &str,
    path: &Path,
    load: impl FnOnce(&Path) -> Result<T, E>,
) -> ModalityTable<T> {
    if !path.is_file() {
        warn!("[DATA] No {} data at {:?}", name, path);
        return ModalityTable::Absent;
    }

    match load(path) {
        Ok(value) => ModalityTable::Present(value),
        Err(e) => {
            warn!("[DATA] Skipping {} data: {}", name, e);
            ModalityTable::Absent
        }
    }
}

fn load_frame_table(name: &str, path: &Path, key: &str) -> ModalityTable<FrameTable> {
    load_modality(name, path, |path| {
        let table = Table::from_path(path)?;
        let rows = table.len();
        let indexed = FrameTable::index(table, key).map_err(|e| VizError::table(path, e))?;
        info!(
            "[DATA] {}: {} rows across {} frames",
            name,
            rows,
            indexed.frame_count()
        );
        Ok::<_, VizError>(indexed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_files_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let data = SessionData::load(dir.path());
        assert!(!data.analysis.is_present());
        assert!(!data.openface.is_present());
        assert!(!data.times.is_present());
    }

    #[test]
    fn test_malformed_files_are_absent_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("gaze.csv"), "NotAFrame,Gaze\n1,Robot\n").unwrap();
        fs::write(dir.path().join("analysis.csv"), "Start Frame,End Frame\nx,y\n").unwrap();
        fs::write(dir.path().join("time.csv"), "Frame,Seconds\n1,0.033\n").unwrap();

        let data = SessionData::load(dir.path());
        assert!(!data.gaze.is_present());
        assert!(!data.analysis.is_present());
        assert_eq!(data.times.as_present().and_then(|t| t.seconds(1)), Some(0.033));
    }

    #[test]
    fn test_bad_rows_do_not_discard_the_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            table_path(dir.path(), "analysis"),
            "Start Frame,End Frame,Round No.,Action,State\n10,20,1,Handover,Failure\n,,,,\n",
        )
        .unwrap();
        fs::write(
            table_path(dir.path(), "speech"),
            "Id,Text,BeginTime,EndTime,Admiration,Awe\nP,Hi,0.1,0.4,0.3,0.2\nR,Hello,0.5,0.9,,0.6\n",
        )
        .unwrap();

        let data = SessionData::load(dir.path());
        assert_eq!(data.analysis.as_present().map(Vec::len), Some(1));
        let speech = data.speech.as_present().unwrap();
        assert_eq!(speech.len(), 2);
        assert_eq!(speech[1].emotions, vec![("Awe", 0.6)]);
    }
}
