// REFLEX Viz - Video Modules
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod probe;
pub mod source;
pub mod sync;

pub use probe::{probe_video, VideoInfo};
pub use source::{Frame, VideoSource};
pub use sync::{frames_to_advance, synchronized_frame};
