// REFLEX Viz - Participant Resolution
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Participant codes look like `C1-4` or `D2-11`: an experimental condition
// followed by a session number (1-11). Each condition maps to a fixed
// folder under the dataset root.

use crate::error::{VizError, VizResult};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

const CODE_PATTERN: &str = r"^(C[1-3]|D[1-2])-([1-9]|1[0-1])$";

fn code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CODE_PATTERN).expect("participant code pattern is valid"))
}

/// Robot failure-handling strategy the participant was exposed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    FixedLow,
    FixedMedium,
    FixedHigh,
    DecaySmooth,
    DecayRapid,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::FixedLow,
        Condition::FixedMedium,
        Condition::FixedHigh,
        Condition::DecaySmooth,
        Condition::DecayRapid,
    ];

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "C1" => Some(Self::FixedLow),
            "C2" => Some(Self::FixedMedium),
            "C3" => Some(Self::FixedHigh),
            "D1" => Some(Self::DecaySmooth),
            "D2" => Some(Self::DecayRapid),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::FixedLow => "C1",
            Self::FixedMedium => "C2",
            Self::FixedHigh => "C3",
            Self::DecaySmooth => "D1",
            Self::DecayRapid => "D2",
        }
    }

    /// Folder holding every participant of this condition.
    pub fn folder_name(&self) -> &'static str {
        match self {
            Self::FixedLow => "C1-Fixed-Low",
            Self::FixedMedium => "C2-Fixed-Medium",
            Self::FixedHigh => "C3-Fixed-High",
            Self::DecaySmooth => "D1-Decay-Smooth",
            Self::DecayRapid => "D2-Decay-Rapid",
        }
    }
}

/// A validated participant code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantCode {
    condition: Condition,
    session: u8,
}

impl ParticipantCode {
    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn session(&self) -> u8 {
        self.session
    }

    /// `<root>/<condition folder>/<code>`; does not touch the filesystem.
    pub fn folder_under(&self, dataset_root: &Path) -> PathBuf {
        dataset_root
            .join(self.condition.folder_name())
            .join(self.to_string())
    }

    /// Resolve the participant folder, failing if it is not a directory.
    pub fn resolve_folder(&self, dataset_root: &Path) -> VizResult<PathBuf> {
        let path = self.folder_under(dataset_root);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(VizError::ParticipantFolderMissing {
                code: self.to_string(),
                path,
            })
        }
    }
}

impl FromStr for ParticipantCode {
    type Err = VizError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let caps = code_regex()
            .captures(code)
            .ok_or_else(|| VizError::InvalidParticipant(code.to_string()))?;

        let condition = Condition::from_prefix(&caps[1])
            .ok_or_else(|| VizError::InvalidParticipant(code.to_string()))?;
        let session = caps[2]
            .parse::<u8>()
            .map_err(|_| VizError::InvalidParticipant(code.to_string()))?;

        Ok(Self { condition, session })
    }
}

impl fmt::Display for ParticipantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.condition.prefix(), self.session)
    }
}

/// Default dataset root: two levels above the working directory.
pub fn default_dataset_root() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    cwd.join("..").join("..").join("Dataset")
}
