// REFLEX Viz - Error Types
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::path::PathBuf;
use thiserror::Error;

/// Result type for visualization operations.
pub type VizResult<T> = Result<T, VizError>;

/// Errors that can stop a visualization session.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Failed to open video file {path}: {reason}")]
    VideoOpen { path: PathBuf, reason: String },

    #[error("Invalid participant code: {0}")]
    InvalidParticipant(String),

    #[error("Could not find data for participant {code} at {path}")]
    ParticipantFolderMissing { code: String, path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Error reading table {path}: {reason}")]
    Table { path: PathBuf, reason: String },

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VizError {
    pub fn video_open(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::VideoOpen {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn table(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Table {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn sink(message: impl ToString) -> Self {
        Self::Sink(message.to_string())
    }
}

/// A field could not be extracted from a modality row.
///
/// Never escapes a modality resolver: the resolver turns it into a cleared
/// display for that modality only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' has unparseable value '{value}'")]
    Unparseable { column: String, value: String },
}
