use super::*;
use crate::export::sink::InMemoryExportSink;
use crate::foundation::core::Rect;
use crate::foundation::error::SketchError;

/// Renders a solid raster whose red channel is the first stroke byte.
struct SolidRenderer;

impl StrokeRenderer for SolidRenderer {
    fn rasterize(&self, stroke_data: &[u8], request: &RasterRequest) -> SketchResult<RasterImage> {
        let Some(&r) = stroke_data.first() else {
            return Err(SketchError::rasterize("no strokes"));
        };
        RasterImage::filled(
            request.rect.width() as u32,
            request.rect.height() as u32,
            Rgba8::new(r, 0, 0, 255),
        )
    }
}

fn settings() -> EncodeSettings {
    EncodeSettings {
        quality: 70,
        matte: Rgba8::WHITE,
        fit: BackgroundFit::Stretch,
    }
}

fn job(slot: &Arc<CompositeSlot>, byte: Option<u8>) -> CompositeJob {
    CompositeJob {
        page_index: 0,
        generation: 0,
        slot: Arc::clone(slot),
        stroke_data: byte.into_iter().collect(),
        background: None,
        request: RasterRequest {
            rect: Rect::new(0.0, 0.0, 4.0, 4.0),
            scale: 1.0,
            clear: None,
        },
        renderer: Arc::new(SolidRenderer),
    }
}

#[test]
fn job_stores_composite_and_exports() {
    let sink = InMemoryExportSink::new();
    let worker = CompositeWorker::spawn(Box::new(sink.clone()), settings()).unwrap();
    let slot = Arc::new(CompositeSlot::default());

    worker.submit(job(&slot, Some(200)));
    worker.flush();

    let stored = slot.get().expect("composite stored");
    assert_eq!((stored.width(), stored.height()), (4, 4));
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.exports()[0].image.pixel(0, 0), Some([200, 0, 0, 255]));

    let stats = worker.stats();
    assert_eq!(stats.dispatched, 1);
    assert_eq!(stats.stored, 1);
    assert_eq!(stats.exported, 1);
}

#[test]
fn older_generation_is_skipped_once_newer_is_claimed() {
    let sink = InMemoryExportSink::new();
    let worker = CompositeWorker::spawn(Box::new(sink.clone()), settings()).unwrap();
    let slot = Arc::new(CompositeSlot::default());

    let mut stale = job(&slot, Some(10));
    stale.generation = slot.claim();
    // A newer save claims the slot before the stale job reaches the worker.
    slot.claim();
    worker
        .tx
        .as_ref()
        .unwrap()
        .send(WorkerMsg::Job(Box::new(stale)))
        .unwrap();
    worker.flush();

    assert!(slot.get().is_none());
    assert!(sink.is_empty());
    assert_eq!(worker.stats().superseded, 1);

    worker.submit(job(&slot, Some(30)));
    worker.flush();
    assert!(slot.get().is_some());
    assert_eq!(sink.len(), 1);
}

#[test]
fn raster_failure_keeps_previous_composite() {
    let sink = InMemoryExportSink::new();
    let worker = CompositeWorker::spawn(Box::new(sink.clone()), settings()).unwrap();
    let slot = Arc::new(CompositeSlot::default());

    worker.submit(job(&slot, Some(50)));
    worker.flush();
    let before = slot.get().unwrap();

    worker.submit(job(&slot, None));
    worker.flush();

    assert_eq!(slot.get().unwrap(), before);
    assert_eq!(sink.len(), 1);
    assert_eq!(worker.stats().raster_failures, 1);
}

struct RejectingSink;

impl ExportSink for RejectingSink {
    fn export(&mut self, _page_index: usize, _image: &RasterImage) -> SketchResult<()> {
        Err(SketchError::export("library unavailable"))
    }
}

#[test]
fn export_failure_is_counted_and_composite_still_stored() {
    let worker = CompositeWorker::spawn(Box::new(RejectingSink), settings()).unwrap();
    let slot = Arc::new(CompositeSlot::default());

    worker.submit(job(&slot, Some(1)));
    worker.flush();

    assert!(slot.get().is_some());
    let stats = worker.stats();
    assert_eq!(stats.export_failures, 1);
    assert_eq!(stats.exported, 0);
}

#[test]
fn template_is_composed_under_strokes() {
    let sink = InMemoryExportSink::new();
    let worker = CompositeWorker::spawn(Box::new(sink.clone()), settings()).unwrap();
    let slot = Arc::new(CompositeSlot::default());

    let mut j = job(&slot, Some(0));
    j.renderer = Arc::new(TransparentRenderer);
    j.background = Some(Arc::new(
        RasterImage::filled(2, 2, Rgba8::new(0, 255, 0, 255)).unwrap(),
    ));
    worker.submit(j);
    worker.flush();

    let exported = &sink.exports()[0].image;
    assert_eq!((exported.width(), exported.height()), (4, 4));
    assert_eq!(exported.pixel(3, 3), Some([0, 255, 0, 255]));
}

struct TransparentRenderer;

impl StrokeRenderer for TransparentRenderer {
    fn rasterize(&self, _stroke_data: &[u8], request: &RasterRequest) -> SketchResult<RasterImage> {
        RasterImage::transparent(request.rect.width() as u32, request.rect.height() as u32)
    }
}

#[test]
fn drop_drains_pending_jobs() {
    let sink = InMemoryExportSink::new();
    let slot = Arc::new(CompositeSlot::default());
    {
        let worker = CompositeWorker::spawn(Box::new(sink.clone()), settings()).unwrap();
        worker.submit(job(&slot, Some(7)));
    }
    assert_eq!(sink.len(), 1);
    assert!(slot.get().is_some());
}
