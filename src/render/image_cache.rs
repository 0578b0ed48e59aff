// REFLEX Viz - Overlay Image Cache
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::error::VizResult;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Placeholder shown when no failure phase is active, and the fallback for
/// overlays that fail to load.
pub const EMPTY_IMAGE: &str = "empty";

/// Encode an RGB image as JPEG at `quality` (1-100).
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> VizResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    encoder.encode(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)?;
    Ok(bytes)
}

/// Decoded overlay images keyed by path. Each path is decoded at most once,
/// failures included.
#[derive(Debug)]
pub struct ImageCache {
    visuals_dir: PathBuf,
    entries: HashMap<PathBuf, Option<RgbImage>>,
    decodes: usize,
}

impl ImageCache {
    pub fn new(visuals_dir: impl Into<PathBuf>) -> Self {
        Self {
            visuals_dir: visuals_dir.into(),
            entries: HashMap::new(),
            decodes: 0,
        }
    }

    /// Number of decode attempts made so far.
    pub fn decode_count(&self) -> usize {
        self.decodes
    }

    /// Decoded image at `path`, or `None` if it could not be read.
    pub fn load(&mut self, path: &Path) -> Option<&RgbImage> {
        self.ensure(path);
        self.entries.get(path).and_then(Option::as_ref)
    }

    /// Overlay `<visuals_dir>/<stem>.png`, falling back to the empty
    /// placeholder. `None` when neither can be read.
    pub fn overlay(&mut self, stem: &str) -> Option<&RgbImage> {
        let path = self.visuals_dir.join(format!("{}.png", stem));
        let chosen = if self.ensure(&path) {
            path
        } else {
            self.visuals_dir.join(format!("{}.png", EMPTY_IMAGE))
        };
        self.load(&chosen)
    }

    /// Decode `path` unless already attempted; true if a usable image is cached.
    fn ensure(&mut self, path: &Path) -> bool {
        if let Some(entry) = self.entries.get(path) {
            return entry.is_some();
        }

        self.decodes += 1;
        let decoded = match image::open(path) {
            Ok(img) => {
                debug!("[VIZ] Decoded overlay {:?}", path);
                Some(img.to_rgb8())
            }
            Err(e) => {
                warn!("[VIZ] Overlay {:?} unavailable: {}", path, e);
                None
            }
        };
        let ok = decoded.is_some();
        self.entries.insert(path.to_path_buf(), decoded);
        ok
    }
}
