use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::foundation::core::RasterImage;
use crate::foundation::error::{SketchError, SketchResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// Consumer of final page composites (a photo library, a folder, an upload queue...).
///
/// Sinks run on the composite worker thread. Errors are logged by the worker and never reach
/// the session caller; there is no retry.
pub trait ExportSink: Send {
    /// Accept the composite produced by one save of page `page_index` (0-based).
    fn export(&mut self, page_index: usize, image: &RasterImage) -> SketchResult<()>;
}

/// One image captured by [`InMemoryExportSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    /// 0-based page the image was composed for.
    pub page_index: usize,
    /// The exported composite.
    pub image: RasterImage,
}

/// In-memory sink for tests and embedding.
///
/// Clones share the same buffer, so a handle kept by the caller observes exports made by the
/// copy handed to the session.
#[derive(Clone, Debug, Default)]
pub struct InMemoryExportSink {
    exports: Arc<Mutex<Vec<ExportedImage>>>,
}

impl InMemoryExportSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all exports in arrival order.
    pub fn exports(&self) -> Vec<ExportedImage> {
        self.exports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of exports received so far.
    pub fn len(&self) -> usize {
        self.exports.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// `true` when nothing has been exported yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExportSink for InMemoryExportSink {
    fn export(&mut self, page_index: usize, image: &RasterImage) -> SketchResult<()> {
        self.exports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ExportedImage {
                page_index,
                image: image.clone(),
            });
        Ok(())
    }
}

/// Sink that drops every image.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullExportSink;

impl ExportSink for NullExportSink {
    fn export(&mut self, _page_index: usize, _image: &RasterImage) -> SketchResult<()> {
        Ok(())
    }
}

/// Writes every export as `page-XXX-NNNN.png` into a directory.
///
/// `XXX` is the 1-based page number and `NNNN` a per-sink sequence number, so repeated saves of
/// one page never overwrite each other.
#[derive(Debug)]
pub struct DirectoryExportSink {
    dir: PathBuf,
    seq: u64,
}

impl DirectoryExportSink {
    /// Create the sink, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> SketchResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create export dir '{}'", dir.display()))?;
        Ok(Self { dir, seq: 0 })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectoryExportSink {
    fn export(&mut self, page_index: usize, image: &RasterImage) -> SketchResult<()> {
        self.seq += 1;
        let path = self
            .dir
            .join(format!("page-{:03}-{:04}.png", page_index + 1, self.seq));

        let mut rgba = image.data().to_vec();
        unpremultiply_rgba8_in_place(&mut rgba);
        let buf = image::RgbaImage::from_raw(image.width(), image.height(), rgba)
            .ok_or_else(|| SketchError::export("raster buffer does not match its dimensions"))?;
        buf.save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| SketchError::export(format!("write '{}': {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "exported page composite");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
