use crate::config::LayoutMetrics;
use crate::error::Warning;

use super::page::{DrawOp, Page, RowPlacement};

/// Slack for cursor comparisons; sums of fractional metrics drift in f32.
const EPSILON: f32 = 1e-3;

/// Outcome of asking for room on the current page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    CurrentPage,
    NewPage,
}

/// Owns the page list and the vertical write cursor for one render pass.
/// Pages are only ever appended; blocks are never split across pages.
pub struct Paginator<'m> {
    metrics: &'m LayoutMetrics,
    pages: Vec<Page>,
    warnings: Vec<Warning>,
}

impl<'m> Paginator<'m> {
    pub fn new(metrics: &'m LayoutMetrics) -> Self {
        Self {
            metrics,
            pages: vec![Page::new(1, metrics.content_top())],
            warnings: Vec::new(),
        }
    }

    pub fn metrics(&self) -> &'m LayoutMetrics {
        self.metrics
    }

    fn current(&self) -> &Page {
        // `new` seeds one page and pages are never removed.
        &self.pages[self.pages.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn cursor_y(&self) -> f32 {
        self.current().cursor_y
    }

    pub fn page_index(&self) -> usize {
        self.current().index
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn remaining(&self) -> f32 {
        self.metrics.content_bottom() - self.cursor_y()
    }

    /// True when nothing has advanced the cursor on the current page.
    pub fn at_page_top(&self) -> bool {
        (self.cursor_y() - self.metrics.content_top()).abs() < EPSILON
    }

    pub fn fits(&self, height: f32) -> bool {
        self.cursor_y() + height <= self.metrics.content_bottom() + EPSILON
    }

    /// Make room for a block of `height`: start a new page when it does not fit
    /// below the cursor. A block at the top of a fresh page stays there even if
    /// it is taller than the content band, so oversized blocks cannot cause an
    /// endless run of empty pages.
    pub fn reserve(&mut self, height: f32) -> Placement {
        if self.fits(height) || self.at_page_top() {
            return Placement::CurrentPage;
        }
        self.new_page();
        Placement::NewPage
    }

    pub fn new_page(&mut self) {
        let index = self.pages.len() + 1;
        log::debug!(
            "page break: page {} ended at y={:.2}, starting page {index}",
            index - 1,
            self.cursor_y()
        );
        self.pages
            .push(Page::new(index, self.metrics.content_top()));
    }

    pub fn advance(&mut self, height: f32) {
        self.current_mut().cursor_y += height;
    }

    /// Advance by a gap that has no content of its own; clamps at the content
    /// bottom so spacing alone never pushes the cursor off the page.
    pub fn skip(&mut self, gap: f32) {
        if self.at_page_top() {
            return;
        }
        let bottom = self.metrics.content_bottom();
        let page = self.current_mut();
        page.cursor_y = (page.cursor_y + gap).min(bottom);
    }

    pub fn draw(&mut self, op: DrawOp) {
        self.current_mut().ops.push(op);
    }

    pub fn record_row(&mut self, placement: RowPlacement) {
        self.current_mut().rows.push(placement);
    }

    pub fn warn(&mut self, warning: Warning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn finish(self) -> (Vec<Page>, Vec<Warning>) {
        (self.pages, self.warnings)
    }
}
