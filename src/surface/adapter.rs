use std::sync::Arc;

use crate::foundation::core::{RasterImage, Rect, Rgba8};
use crate::foundation::error::SketchResult;

/// Parameters for rasterizing a stroke blob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterRequest {
    /// Region of the drawing, in surface points, to rasterize.
    pub rect: Rect,
    /// Pixels per surface point.
    pub scale: f64,
    /// If set, the output is cleared to this color before strokes are drawn.
    pub clear: Option<Rgba8>,
}

/// Turns serialized strokes into pixels.
///
/// Renderers are handed to the composite worker and run off the session's thread, so they work
/// from a stroke blob captured at save time instead of the live surface.
pub trait StrokeRenderer: Send + Sync {
    /// Decode `stroke_data` and rasterize it as described by `request`.
    fn rasterize(&self, stroke_data: &[u8], request: &RasterRequest)
    -> SketchResult<RasterImage>;
}

/// Events a drawing surface reports back to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The user lifted the pen after a stroke gesture.
    StrokeGestureCompleted,
}

/// The live vector drawing surface the session drives.
///
/// The session never inspects stroke content: it moves opaque blobs between pages and the
/// surface, and asks the surface for a renderer when a composite is due.
pub trait DrawingSurface {
    /// Serialize the current strokes into an opaque blob.
    fn serialize(&self) -> Vec<u8>;

    /// Replace the current strokes with the ones in `bytes`.
    ///
    /// Returns [`crate::SketchError::Decode`] on malformed input.
    fn deserialize(&mut self, bytes: &[u8]) -> SketchResult<()>;

    /// Clear the surface to an empty drawing.
    fn reset(&mut self);

    /// Full drawable content region in surface points.
    fn content_rect(&self) -> Rect;

    /// Set the surface's own background; [`Rgba8::TRANSPARENT`] lets a template show through.
    fn set_background(&mut self, color: Rgba8);

    /// Current surface background.
    fn background(&self) -> Rgba8;

    /// Renderer able to rasterize blobs produced by [`DrawingSurface::serialize`].
    fn renderer(&self) -> Arc<dyn StrokeRenderer>;

    /// Rasterize the live strokes over the surface background.
    fn rasterize(&self, rect: Rect, scale: f64) -> SketchResult<RasterImage> {
        let background = self.background();
        let request = RasterRequest {
            rect,
            scale,
            clear: (background.a > 0).then_some(background),
        };
        self.renderer().rasterize(&self.serialize(), &request)
    }
}
