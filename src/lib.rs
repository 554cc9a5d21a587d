//! sketchbook is the core of a multi-page freehand drawing editor.
//!
//! A [`DrawingSession`] owns an ordered list of [`Page`]s and a live [`DrawingSurface`]. Every
//! navigation, page insertion, finished stroke, and close autosaves the current page:
//!
//! - the surface's stroke blob is written into the page before the intent returns
//! - a snapshot is composed over the page template, JPEG-encoded into the page, and handed to an
//!   [`ExportSink`] on a background worker
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Compositing, encoding, and the composite worker.
pub mod composite;
/// Export sinks.
pub mod export;
/// Page data model.
pub mod page;
/// Session state machine.
pub mod session;
/// Drawing surface seam and reference surface.
pub mod surface;

pub use crate::foundation::core::{Canvas, Point, RasterImage, Rect, Rgba8};
pub use crate::foundation::error::{SketchError, SketchResult};

pub use crate::composite::compositor::{BackgroundFit, compose};
pub use crate::composite::encode::{DEFAULT_JPEG_QUALITY, EncodedImage, decode_image, encode_jpeg};
pub use crate::composite::worker::CompositeStats;
pub use crate::export::sink::{
    DirectoryExportSink, ExportSink, ExportedImage, InMemoryExportSink, NullExportSink,
};
pub use crate::page::model::{Backdrop, Page};
pub use crate::session::drawing_session::{Direction, DrawingSession, Intent};
pub use crate::session::opts::SessionOpts;
pub use crate::session::view::SessionView;
pub use crate::surface::adapter::{DrawingSurface, RasterRequest, StrokeRenderer, SurfaceEvent};
pub use crate::surface::vector::{Stroke, VectorRenderer, VectorSurface};
