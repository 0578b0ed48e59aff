// REFLEX Viz - Time-Window Cursor
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Failure phases and speech segments are sorted, non-overlapping windows
// consumed in playback order. The cursor is an index into the immutable
// window list: it only moves forward and never revisits a passed window.

/// A bounded span of playback (frames or seconds) with a payload.
pub trait Window {
    type Pos: PartialOrd + Copy;

    fn start(&self) -> Self::Pos;
    fn end(&self) -> Self::Pos;

    /// Bounds are inclusive at both ends.
    fn contains(&self, pos: Self::Pos) -> bool {
        self.start() <= pos && pos <= self.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorState<'a, W> {
    /// Position is inside the current window.
    Active(&'a W),
    /// Waiting for the next window to begin.
    Inactive,
    /// Every window has been passed. Terminal.
    Exhausted,
}

impl<'a, W> CursorState<'a, W> {
    pub fn active(&self) -> Option<&'a W> {
        match self {
            Self::Active(w) => Some(w),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowCursor<W> {
    windows: Vec<W>,
    current: usize,
}

impl<W: Window> WindowCursor<W> {
    pub fn new(windows: Vec<W>) -> Self {
        Self { windows, current: 0 }
    }

    /// Move past every window that ends before `pos`, then report where
    /// `pos` falls.
    pub fn advance(&mut self, pos: W::Pos) -> CursorState<'_, W> {
        while let Some(window) = self.windows.get(self.current) {
            if pos > window.end() {
                self.current += 1;
            } else {
                break;
            }
        }

        match self.windows.get(self.current) {
            None => CursorState::Exhausted,
            Some(window) if window.contains(pos) => CursorState::Active(window),
            Some(_) => CursorState::Inactive,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.current >= self.windows.len()
    }

    /// Windows not yet passed.
    pub fn remaining(&self) -> &[W] {
        &self.windows[self.current.min(self.windows.len())..]
    }

    pub fn windows(&self) -> &[W] {
        &self.windows
    }
}
