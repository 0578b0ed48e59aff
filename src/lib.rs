// REFLEX Viz - Library Root
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Synchronized playback of a REFLEX participant session: two camera streams
// plus the per-frame gaze, body, face and speech annotations.

pub mod config;
pub mod cursor;
pub mod data;
pub mod error;
pub mod participant;
pub mod render;
pub mod telemetry;
pub mod video;

pub use config::{OutputTarget, Settings, VisualizationConfig};
pub use error::{VizError, VizResult};
pub use participant::ParticipantCode;
