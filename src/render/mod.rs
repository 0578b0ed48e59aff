// REFLEX Viz - Rendering
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod image_cache;
pub mod layout;
pub mod modalities;
pub mod rerun_sink;
pub mod sink;
pub mod visualizer;

pub use image_cache::{encode_jpeg, ImageCache};
pub use layout::{entity, Layout};
pub use rerun_sink::RerunSink;
pub use sink::{MemorySink, SessionSetup, Sink, Visual};
pub use visualizer::{adjusted_index, CameraMode, SessionSummary, Visualizer};
