use std::sync::Arc;

use crate::foundation::core::{RasterImage, Rgba8};
use crate::page::model::Backdrop;

/// Everything the presentation shell renders for the current page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionView {
    /// 1-based number of the current page.
    pub current_page_number: usize,
    /// Number of pages in the session.
    pub total_pages: usize,
    /// Whether the "previous page" control is enabled.
    pub previous_enabled: bool,
    /// Whether the "next page" control is enabled.
    pub next_enabled: bool,
    /// Backdrop of the current page.
    pub backdrop: Backdrop,
    /// Whether the shell should accept stroke input (and show its tool picker).
    pub editing_enabled: bool,
}

impl SessionView {
    pub(crate) fn new(
        current_index: usize,
        total_pages: usize,
        backdrop: Backdrop,
        editing_enabled: bool,
    ) -> Self {
        Self {
            current_page_number: current_index + 1,
            total_pages,
            previous_enabled: current_index > 0,
            next_enabled: current_index + 1 < total_pages,
            backdrop,
            editing_enabled,
        }
    }

    /// Page counter text, e.g. `"2/5"`.
    pub fn page_label(&self) -> String {
        format!("{}/{}", self.current_page_number, self.total_pages)
    }

    /// Flat backdrop color, when the page has no template.
    pub fn background_color(&self) -> Option<Rgba8> {
        match self.backdrop {
            Backdrop::Color(c) => Some(c),
            Backdrop::Template(_) => None,
        }
    }

    /// Template image, when the page has one.
    pub fn background_image(&self) -> Option<&Arc<RasterImage>> {
        match &self.backdrop {
            Backdrop::Template(image) => Some(image),
            Backdrop::Color(_) => None,
        }
    }
}
