use std::sync::Arc;

use crate::composite::worker::{CompositeJob, CompositeStats, CompositeWorker};
use crate::export::sink::ExportSink;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{SketchError, SketchResult};
use crate::page::model::{Backdrop, Page};
use crate::session::opts::SessionOpts;
use crate::session::view::SessionView;
use crate::surface::adapter::{DrawingSurface, RasterRequest, SurfaceEvent};

/// Page navigation direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Towards the first page.
    Previous,
    /// Towards the last page.
    Next,
}

/// User intents forwarded by the presentation shell.
#[derive(Debug)]
pub enum Intent {
    /// Go to the previous page.
    Previous,
    /// Go to the next page.
    Next,
    /// Append a page and make it current.
    AddPage(Page),
    /// A stroke gesture finished on the current page.
    StrokeCompleted,
    /// Save and end the session.
    Close,
}

/// Multi-page drawing session: owns the pages, the current-page cursor, and the live surface.
///
/// Every intent saves the current page first. Saving writes the surface's stroke blob into the
/// page synchronously and hands a snapshot to the composite worker, which composes, encodes,
/// and exports it without blocking the caller.
pub struct DrawingSession<S: DrawingSurface> {
    pages: Vec<Page>,
    current: usize,
    surface: S,
    opts: SessionOpts,
    editing_enabled: bool,
    closed: bool,
    worker: CompositeWorker,
}

impl<S: DrawingSurface> DrawingSession<S> {
    /// Start a session over `pages` (at least one), showing the first page on `surface`.
    pub fn new(
        pages: Vec<Page>,
        surface: S,
        sink: impl ExportSink + 'static,
        opts: SessionOpts,
    ) -> SketchResult<Self> {
        if pages.is_empty() {
            return Err(SketchError::validation(
                "a session needs at least one page",
            ));
        }
        opts.validate()?;

        let worker = CompositeWorker::spawn(Box::new(sink), opts.encode_settings())?;
        let mut session = Self {
            pages,
            current: 0,
            surface,
            editing_enabled: opts.editing_enabled,
            opts,
            closed: false,
            worker,
        };
        session.load_current();
        session.apply_backdrop();
        tracing::info!(pages = session.pages.len(), "drawing session started");
        Ok(session)
    }

    /// Start a session with a single blank page.
    pub fn with_blank_page(
        surface: S,
        sink: impl ExportSink + 'static,
        opts: SessionOpts,
    ) -> SketchResult<Self> {
        Self::new(vec![Page::blank()], surface, sink, opts)
    }

    /// Shell-facing state for the current page.
    pub fn view(&self) -> SessionView {
        SessionView::new(
            self.current,
            self.pages.len(),
            self.pages[self.current].backdrop(),
            self.editing_enabled,
        )
    }

    /// All pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// 0-based index of the current page.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The page currently shown.
    pub fn current_page(&self) -> &Page {
        &self.pages[self.current]
    }

    /// The live drawing surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the live drawing surface, for feeding it strokes.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Options the session was started with.
    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// `true` after [`DrawingSession::close`].
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether stroke gestures are currently accepted.
    pub fn editing_enabled(&self) -> bool {
        self.editing_enabled
    }

    /// Enable or disable stroke editing; the shell mirrors this on its tool picker.
    pub fn set_editing_enabled(&mut self, enabled: bool) -> SketchResult<SessionView> {
        self.ensure_open()?;
        self.editing_enabled = enabled;
        Ok(self.view())
    }

    /// Persist the surface's strokes into the current page and schedule its composite.
    ///
    /// Calling this twice without intervening edits stores identical stroke data.
    pub fn save_current(&mut self) -> SketchResult<()> {
        self.ensure_open()?;
        self.save_page();
        Ok(())
    }

    /// Save, then move one page in `direction`. Moving past either end is a no-op.
    #[tracing::instrument(skip(self))]
    pub fn navigate(&mut self, direction: Direction) -> SketchResult<SessionView> {
        self.ensure_open()?;
        self.save_page();

        let candidate = match direction {
            Direction::Previous => self.current.checked_sub(1),
            Direction::Next => Some(self.current + 1).filter(|&i| i < self.pages.len()),
        };
        match candidate {
            Some(index) => {
                self.current = index;
                self.load_current();
            }
            None => tracing::debug!(current = self.current, "already at the edge; staying"),
        }
        self.apply_backdrop();
        Ok(self.view())
    }

    /// [`DrawingSession::navigate`] towards the first page.
    pub fn previous(&mut self) -> SketchResult<SessionView> {
        self.navigate(Direction::Previous)
    }

    /// [`DrawingSession::navigate`] towards the last page.
    pub fn next(&mut self) -> SketchResult<SessionView> {
        self.navigate(Direction::Next)
    }

    /// Save the current page, append `page`, and make it current.
    #[tracing::instrument(skip(self, page))]
    pub fn add_page(&mut self, page: Page) -> SketchResult<SessionView> {
        self.ensure_open()?;
        self.save_page();

        self.pages.push(page);
        self.current = self.pages.len() - 1;
        self.load_current();
        self.apply_backdrop();
        tracing::debug!(pages = self.pages.len(), "page appended");
        Ok(self.view())
    }

    /// Autosave after a finished stroke gesture, marking the page as edited.
    ///
    /// Ignored while editing is disabled, since no gesture can legitimately finish then.
    #[tracing::instrument(skip(self))]
    pub fn stroke_edit_completed(&mut self) -> SketchResult<SessionView> {
        self.ensure_open()?;
        if !self.editing_enabled {
            tracing::debug!("stroke completed while editing is disabled; ignoring");
            return Ok(self.view());
        }
        self.pages[self.current].mark_edited();
        self.save_page();
        Ok(self.view())
    }

    /// Route an event raised by the drawing surface.
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) -> SketchResult<SessionView> {
        match event {
            SurfaceEvent::StrokeGestureCompleted => self.stroke_edit_completed(),
        }
    }

    /// Final save. Every later intent fails with [`SketchError::SessionClosed`].
    #[tracing::instrument(skip(self))]
    pub fn close(&mut self) -> SketchResult<()> {
        self.ensure_open()?;
        self.save_page();
        self.closed = true;
        tracing::info!(pages = self.pages.len(), "drawing session closed");
        Ok(())
    }

    /// Apply one shell intent.
    pub fn dispatch(&mut self, intent: Intent) -> SketchResult<SessionView> {
        match intent {
            Intent::Previous => self.navigate(Direction::Previous),
            Intent::Next => self.navigate(Direction::Next),
            Intent::AddPage(page) => self.add_page(page),
            Intent::StrokeCompleted => self.stroke_edit_completed(),
            Intent::Close => {
                self.close()?;
                Ok(self.view())
            }
        }
    }

    /// Block until every composite dispatched so far has been stored and exported.
    pub fn flush_composites(&self) {
        self.worker.flush();
    }

    /// Composite worker counters.
    pub fn composite_stats(&self) -> CompositeStats {
        self.worker.stats()
    }

    /// Wait for pending composites and hand the pages back.
    pub fn into_pages(self) -> Vec<Page> {
        self.worker.flush();
        self.pages
    }

    fn ensure_open(&self) -> SketchResult<()> {
        if self.closed {
            return Err(SketchError::SessionClosed);
        }
        Ok(())
    }

    fn save_page(&mut self) {
        let stroke_data = self.surface.serialize();
        let rect = self.surface.content_rect();
        let renderer = self.surface.renderer();

        let page = &mut self.pages[self.current];
        page.set_stroke_data(stroke_data.clone());

        let background = page.background_image().cloned();
        // Without a template the surface paints the page color itself, so the raster carries it.
        let clear = match background {
            Some(_) => None,
            None => Some(page.background_color()),
        };
        self.worker.submit(CompositeJob {
            page_index: self.current,
            generation: 0,
            slot: Arc::clone(page.composite_slot()),
            stroke_data,
            background,
            request: RasterRequest {
                rect,
                scale: self.opts.raster_scale,
                clear,
            },
            renderer,
        });
    }

    fn load_current(&mut self) {
        let page = &self.pages[self.current];
        match page.stroke_data() {
            Some(bytes) => {
                if let Err(err) = self.surface.deserialize(bytes) {
                    tracing::warn!(page = self.current, %err, "unreadable strokes; loading empty drawing");
                    self.surface.reset();
                }
            }
            None => self.surface.reset(),
        }
    }

    fn apply_backdrop(&mut self) {
        let color = match self.pages[self.current].backdrop() {
            Backdrop::Template(_) => Rgba8::TRANSPARENT,
            Backdrop::Color(c) => c,
        };
        self.surface.set_background(color);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/drawing_session.rs"]
mod tests;
