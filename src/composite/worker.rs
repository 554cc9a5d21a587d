use std::sync::{Arc, Mutex, mpsc};
use std::thread::JoinHandle;

use anyhow::Context;

use crate::composite::compositor::{BackgroundFit, compose};
use crate::composite::encode::encode_jpeg;
use crate::export::sink::ExportSink;
use crate::foundation::core::{RasterImage, Rgba8};
use crate::foundation::error::SketchResult;
use crate::page::model::CompositeSlot;
use crate::surface::adapter::{RasterRequest, StrokeRenderer};

/// Composite worker counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositeStats {
    /// Jobs handed to the worker.
    pub dispatched: u64,
    /// Jobs skipped because a newer save of the same page was dispatched first.
    pub superseded: u64,
    /// Composites written into their page.
    pub stored: u64,
    /// Jobs abandoned because rasterization failed.
    pub raster_failures: u64,
    /// Composites whose lossy encoding failed.
    pub encode_failures: u64,
    /// Images accepted by the export sink.
    pub exported: u64,
    /// Images rejected by the export sink.
    pub export_failures: u64,
}

/// Encoding parameters fixed for the worker's lifetime.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EncodeSettings {
    pub(crate) quality: u8,
    pub(crate) matte: Rgba8,
    pub(crate) fit: BackgroundFit,
}

/// Everything a composite needs, captured at save time.
///
/// The worker never looks at live session state: the stroke blob, template, and raster region
/// are snapshots, and the result lands in the page's shared slot.
pub(crate) struct CompositeJob {
    pub(crate) page_index: usize,
    /// Assigned by [`CompositeWorker::submit`].
    pub(crate) generation: u64,
    pub(crate) slot: Arc<CompositeSlot>,
    pub(crate) stroke_data: Vec<u8>,
    pub(crate) background: Option<Arc<RasterImage>>,
    pub(crate) request: RasterRequest,
    pub(crate) renderer: Arc<dyn StrokeRenderer>,
}

enum WorkerMsg {
    Job(Box<CompositeJob>),
    Flush(mpsc::Sender<()>),
}

/// Background thread that composes, encodes, and exports page saves in dispatch order.
///
/// Jobs for the same page are last-write-wins: submitting a job claims a new generation on the
/// page's slot, and any older job still queued for that slot is skipped when reached.
pub(crate) struct CompositeWorker {
    tx: Option<mpsc::Sender<WorkerMsg>>,
    handle: Option<JoinHandle<()>>,
    stats: Arc<Mutex<CompositeStats>>,
}

impl CompositeWorker {
    pub(crate) fn spawn(sink: Box<dyn ExportSink>, settings: EncodeSettings) -> SketchResult<Self> {
        let (tx, rx) = mpsc::channel::<WorkerMsg>();
        let stats = Arc::new(Mutex::new(CompositeStats::default()));
        let worker_stats = Arc::clone(&stats);
        let handle = std::thread::Builder::new()
            .name("sketchbook-composite".to_string())
            .spawn(move || run(rx, sink, settings, worker_stats))
            .context("spawn composite worker thread")?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            stats,
        })
    }

    /// Queue `job`, claiming a fresh generation on its page slot.
    pub(crate) fn submit(&self, mut job: CompositeJob) {
        job.generation = job.slot.claim();
        bump(&self.stats, |s| s.dispatched += 1);
        let page = job.page_index;
        let sent = self
            .tx
            .as_ref()
            .is_some_and(|tx| tx.send(WorkerMsg::Job(Box::new(job))).is_ok());
        if !sent {
            tracing::warn!(page, "composite worker is gone; dropping job");
        }
    }

    /// Block until every job submitted so far has been processed.
    pub(crate) fn flush(&self) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if tx.send(WorkerMsg::Flush(ack_tx)).is_ok() {
            // A disconnect here means the worker exited; nothing is left to wait for.
            let _ = ack_rx.recv();
        }
    }

    pub(crate) fn stats(&self) -> CompositeStats {
        *self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for CompositeWorker {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain the queue and exit.
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("composite worker panicked");
        }
    }
}

fn run(
    rx: mpsc::Receiver<WorkerMsg>,
    mut sink: Box<dyn ExportSink>,
    settings: EncodeSettings,
    stats: Arc<Mutex<CompositeStats>>,
) {
    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMsg::Job(job) => process(&job, sink.as_mut(), settings, &stats),
            WorkerMsg::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

fn process(
    job: &CompositeJob,
    sink: &mut dyn ExportSink,
    settings: EncodeSettings,
    stats: &Mutex<CompositeStats>,
) {
    let page = job.page_index;
    let generation = job.generation;
    if !job.slot.is_latest(generation) {
        tracing::debug!(page, generation, "composite superseded by a newer save");
        bump(stats, |s| s.superseded += 1);
        return;
    }

    let raster = match job.renderer.rasterize(&job.stroke_data, &job.request) {
        Ok(raster) => raster,
        Err(err) => {
            tracing::warn!(page, generation, %err, "skipping composite: rasterization failed");
            bump(stats, |s| s.raster_failures += 1);
            return;
        }
    };
    let composed = compose(job.background.as_deref(), raster, settings.fit);

    match encode_jpeg(&composed, settings.quality, settings.matte) {
        Ok(encoded) => {
            if job.slot.store(generation, encoded) {
                bump(stats, |s| s.stored += 1);
            } else {
                tracing::debug!(page, generation, "newer composite already stored");
            }
        }
        Err(err) => {
            tracing::warn!(page, generation, %err, "composite encoding failed");
            bump(stats, |s| s.encode_failures += 1);
        }
    }

    match sink.export(page, &composed) {
        Ok(()) => bump(stats, |s| s.exported += 1),
        Err(err) => {
            tracing::warn!(page, generation, %err, "export sink rejected composite");
            bump(stats, |s| s.export_failures += 1);
        }
    }
}

fn bump(stats: &Mutex<CompositeStats>, f: impl FnOnce(&mut CompositeStats)) {
    f(&mut stats.lock().unwrap_or_else(|e| e.into_inner()));
}

#[cfg(test)]
#[path = "../../tests/unit/composite/worker.rs"]
mod tests;
