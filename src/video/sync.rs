// REFLEX Viz - Frame Synchronizer
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// The second camera runs at a higher, non-integer multiple of the primary
// frame rate. A fixed 4-3-3 cadence keeps it roughly aligned.

use super::source::Frame;
use tracing::debug;

/// Secondary frames to advance for a given (1-based) primary index.
pub fn frames_to_advance(primary_index: u64) -> usize {
    if primary_index % 3 == 0 {
        4
    } else {
        3
    }
}

/// Advance `secondary` by the cadence for `primary_index` and return the last
/// frame read. Stops early when the stream runs dry.
pub fn synchronized_frame<I>(secondary: &mut I, primary_index: u64) -> Option<Frame>
where
    I: Iterator<Item = Frame> + ?Sized,
{
    let wanted = frames_to_advance(primary_index);
    let mut last = None;
    for read in 0..wanted {
        match secondary.next() {
            Some(frame) => last = Some(frame),
            None => {
                debug!(
                    "[SYNC] Second camera ran dry after {}/{} frames at primary frame {}",
                    read, wanted, primary_index
                );
                break;
            }
        }
    }
    last
}
