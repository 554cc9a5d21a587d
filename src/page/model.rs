use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::composite::encode::EncodedImage;
use crate::foundation::core::{RasterImage, Rgba8};

/// What the shell should render beneath the live stroke layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backdrop {
    /// A template image placed behind a transparent drawing surface.
    Template(Arc<RasterImage>),
    /// A flat color painted by the drawing surface itself.
    Color(Rgba8),
}

/// One editable drawing slot: its strokes, its backdrop, and its cached composite.
///
/// `composite_image` is a cache derived from `(background_image, stroke_data)` and is refreshed
/// asynchronously by the session after every save.
#[derive(Debug, Default)]
pub struct Page {
    stroke_data: Option<Vec<u8>>,
    background_image: Option<Arc<RasterImage>>,
    background_color: Rgba8,
    is_edited: bool,
    composite: Arc<CompositeSlot>,
}

impl Page {
    /// An empty page on a white backdrop.
    pub fn blank() -> Self {
        Self::default()
    }

    /// An empty page on a flat `color` backdrop.
    pub fn with_color(color: Rgba8) -> Self {
        Self {
            background_color: color,
            ..Self::default()
        }
    }

    /// An empty page drawn over a template image.
    pub fn with_template(image: impl Into<Arc<RasterImage>>) -> Self {
        Self {
            background_image: Some(image.into()),
            ..Self::default()
        }
    }

    /// Attach previously saved stroke data, for sessions restored from prior work.
    pub fn with_strokes(mut self, stroke_data: Vec<u8>) -> Self {
        self.stroke_data = Some(stroke_data);
        self
    }

    /// Attach a previously computed composite.
    pub fn with_composite(self, image: EncodedImage) -> Self {
        self.composite.store(0, image);
        self
    }

    /// Mark the page as already edited.
    pub fn edited(mut self) -> Self {
        self.is_edited = true;
        self
    }

    /// Serialized strokes, or `None` when nothing has been saved yet.
    pub fn stroke_data(&self) -> Option<&[u8]> {
        self.stroke_data.as_deref()
    }

    /// Template image drawn beneath the strokes, if any.
    pub fn background_image(&self) -> Option<&Arc<RasterImage>> {
        self.background_image.as_ref()
    }

    /// Flat backdrop color, meaningful only without a template.
    pub fn background_color(&self) -> Rgba8 {
        self.background_color
    }

    /// `true` once a stroke gesture has completed on this page.
    pub fn is_edited(&self) -> bool {
        self.is_edited
    }

    /// Last lossy composite of background and strokes.
    pub fn composite_image(&self) -> Option<EncodedImage> {
        self.composite.get()
    }

    /// The backdrop that drives what is visible beneath the strokes.
    pub fn backdrop(&self) -> Backdrop {
        match &self.background_image {
            Some(image) => Backdrop::Template(Arc::clone(image)),
            None => Backdrop::Color(self.background_color),
        }
    }

    pub(crate) fn set_stroke_data(&mut self, data: Vec<u8>) {
        self.stroke_data = Some(data);
    }

    pub(crate) fn mark_edited(&mut self) {
        self.is_edited = true;
    }

    pub(crate) fn composite_slot(&self) -> &Arc<CompositeSlot> {
        &self.composite
    }
}

/// Shared storage for a page's composite, written by the composite worker.
///
/// Each dispatched job claims the next generation from the slot's own counter, so generations
/// stay monotonic across sessions that reuse the page. Only the most recently claimed
/// generation may run, and a stored image is never replaced by one from an older generation.
#[derive(Debug, Default)]
pub(crate) struct CompositeSlot {
    latest: AtomicU64,
    stored: Mutex<Option<(u64, EncodedImage)>>,
}

impl CompositeSlot {
    pub(crate) fn claim(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn is_latest(&self, generation: u64) -> bool {
        self.latest.load(Ordering::Acquire) == generation
    }

    /// Store `image`, returning `false` when a newer generation is already present.
    pub(crate) fn store(&self, generation: u64, image: EncodedImage) -> bool {
        let mut stored = self.stored.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((current, _)) = stored.as_ref()
            && *current > generation
        {
            return false;
        }
        *stored = Some((generation, image));
        true
    }

    pub(crate) fn get(&self) -> Option<EncodedImage> {
        let stored = self.stored.lock().unwrap_or_else(|e| e.into_inner());
        stored.as_ref().map(|(_, image)| image.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/model.rs"]
mod tests;
