use std::sync::Arc;

use kurbo::{BezPath, Cap, Join, PathEl, Shape};

use crate::foundation::core::{Canvas, Point, RasterImage, Rect, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};
use crate::surface::adapter::{DrawingSurface, RasterRequest, StrokeRenderer, SurfaceEvent};

const DOCUMENT_VERSION: u32 = 1;
const PATH_TOLERANCE: f64 = 0.1;

/// A freehand polyline stroke.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    /// Sampled pen positions in surface points.
    pub points: Vec<Point>,
    /// Pen width in surface points.
    pub width: f64,
    /// Ink color (straight alpha).
    pub color: Rgba8,
}

impl Stroke {
    /// Build a stroke, rejecting empty or non-finite input.
    pub fn new(points: Vec<Point>, width: f64, color: Rgba8) -> SketchResult<Self> {
        let stroke = Self {
            points,
            width,
            color,
        };
        stroke.validate()?;
        Ok(stroke)
    }

    fn validate(&self) -> SketchResult<()> {
        if self.points.is_empty() {
            return Err(SketchError::validation("stroke must have at least one point"));
        }
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(SketchError::validation("stroke width must be finite and > 0"));
        }
        if self.points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(SketchError::validation("stroke points must be finite"));
        }
        Ok(())
    }

    /// Filled outline of the stroke (round caps and joins).
    fn outline(&self) -> BezPath {
        if let [p] = self.points.as_slice() {
            return kurbo::Circle::new(*p, self.width / 2.0).to_path(PATH_TOLERANCE);
        }

        let mut centerline = BezPath::new();
        centerline.move_to(self.points[0]);
        for p in &self.points[1..] {
            centerline.line_to(*p);
        }
        let style = kurbo::Stroke::new(self.width)
            .with_caps(Cap::Round)
            .with_join(Join::Round);
        kurbo::stroke(
            centerline.iter(),
            &style,
            &kurbo::StrokeOpts::default(),
            PATH_TOLERANCE,
        )
    }
}

/// Versioned on-disk form of a drawing.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StrokeDocument {
    version: u32,
    strokes: Vec<Stroke>,
}

impl StrokeDocument {
    fn decode(bytes: &[u8]) -> SketchResult<Vec<Stroke>> {
        let doc: StrokeDocument = serde_json::from_slice(bytes)
            .map_err(|e| SketchError::decode(format!("parse stroke document: {e}")))?;
        if doc.version != DOCUMENT_VERSION {
            return Err(SketchError::decode(format!(
                "unsupported stroke document version {}",
                doc.version
            )));
        }
        for stroke in &doc.strokes {
            stroke
                .validate()
                .map_err(|e| SketchError::decode(e.to_string()))?;
        }
        Ok(doc.strokes)
    }
}

/// In-memory vector drawing surface backed by polyline strokes.
pub struct VectorSurface {
    canvas: Canvas,
    strokes: Vec<Stroke>,
    background: Rgba8,
    renderer: Arc<VectorRenderer>,
}

impl VectorSurface {
    /// Create an empty surface of the given content size.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            strokes: Vec::new(),
            background: Rgba8::WHITE,
            renderer: Arc::new(VectorRenderer),
        }
    }

    /// Append a finished stroke and report the completed gesture.
    pub fn push_stroke(&mut self, stroke: Stroke) -> SketchResult<SurfaceEvent> {
        stroke.validate()?;
        self.strokes.push(stroke);
        Ok(SurfaceEvent::StrokeGestureCompleted)
    }

    /// Strokes currently on the surface.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Content size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }
}

impl DrawingSurface for VectorSurface {
    fn serialize(&self) -> Vec<u8> {
        let doc = StrokeDocument {
            version: DOCUMENT_VERSION,
            strokes: self.strokes.clone(),
        };
        // Points are validated finite on entry, so this cannot fail in practice.
        serde_json::to_vec(&doc).unwrap_or_else(|err| {
            tracing::warn!(%err, "failed to serialize strokes");
            Vec::new()
        })
    }

    fn deserialize(&mut self, bytes: &[u8]) -> SketchResult<()> {
        self.strokes = StrokeDocument::decode(bytes)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.strokes.clear();
    }

    fn content_rect(&self) -> Rect {
        self.canvas.rect()
    }

    fn set_background(&mut self, color: Rgba8) {
        self.background = color;
    }

    fn background(&self) -> Rgba8 {
        self.background
    }

    fn renderer(&self) -> Arc<dyn StrokeRenderer> {
        self.renderer.clone()
    }
}

/// CPU rasterizer for [`VectorSurface`] stroke blobs, powered by `vello_cpu`.
#[derive(Clone, Copy, Debug, Default)]
pub struct VectorRenderer;

impl StrokeRenderer for VectorRenderer {
    fn rasterize(
        &self,
        stroke_data: &[u8],
        request: &RasterRequest,
    ) -> SketchResult<RasterImage> {
        let strokes = StrokeDocument::decode(stroke_data)?;

        let RasterRequest { rect, scale, clear } = *request;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(SketchError::rasterize("scale must be finite and > 0"));
        }
        let width = pixel_extent(rect.width() * scale, "width")?;
        let height = pixel_extent(rect.height() * scale, "height")?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        if let Some(c) = clear {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        let view = kurbo::Affine::scale(scale) * kurbo::Affine::translate(-rect.origin().to_vec2());
        ctx.set_transform(vello_cpu::kurbo::Affine::new(view.as_coeffs()));
        for stroke in &strokes {
            let c = stroke.color;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            ctx.fill_path(&bezpath_to_cpu(&stroke.outline()));
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        RasterImage::from_premul(
            u32::from(width),
            u32::from(height),
            pixmap.data_as_u8_slice().to_vec(),
        )
    }
}

fn pixel_extent(v: f64, axis: &str) -> SketchResult<u16> {
    let px = v.round();
    if !px.is_finite() || px < 1.0 || px > f64::from(u16::MAX) {
        return Err(SketchError::rasterize(format!(
            "raster {axis} {px} is outside 1..={}",
            u16::MAX
        )));
    }
    Ok(px as u16)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/surface/vector.rs"]
mod tests;
