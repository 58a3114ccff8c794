pub mod footer;
pub mod layout;
pub mod page;
pub mod paginate;
pub mod table;
mod writer;

use crate::config::{LayoutMetrics, RenderOptions, TextStyle, Typography};
use crate::error::{Result, Warning};
use crate::fonts::FontSet;
use crate::model::Document;

use layout::WrappedCell;
use page::{DrawOp, Page};
use paginate::Paginator;

pub use footer::stamp_footers;

/// Pages after layout, before footers. Still open for modification.
#[derive(Clone, Debug)]
pub struct LaidOutDocument {
    pub title: String,
    pub pages: Vec<Page>,
    pub warnings: Vec<Warning>,
}

/// Footer-stamped pages. Read-only from here on.
#[derive(Clone, Debug)]
pub struct PaginatedDocument {
    title: String,
    pages: Vec<Page>,
    warnings: Vec<Warning>,
}

impl PaginatedDocument {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// Draw a wrapped block of text lines, each `line_height` tall, as one unit.
/// `keep_with` is the height of what must follow on the same page.
fn draw_title_block(
    paginator: &mut Paginator,
    text: &str,
    style: TextStyle,
    line_height: f32,
    keep_with: f32,
    fonts: &FontSet,
) -> f32 {
    let m = paginator.metrics();
    let cell = WrappedCell::wrap(text, m.content_width(), fonts.face(style.font), style.size);
    let height = cell.line_count() as f32 * line_height;
    paginator.reserve(height + keep_with);
    let top = paginator.cursor_y();
    for (i, line) in cell.lines.into_iter().enumerate() {
        if line.text.is_empty() {
            continue;
        }
        paginator.draw(DrawOp::Text {
            x: m.margin_left,
            y: top + i as f32 * line_height + line_height * 0.7,
            text: line.text,
            style,
        });
    }
    paginator.advance(height);
    height
}

/// Lay out the whole document: title, then per section its title, its table
/// header and its rows, allocating pages on demand.
pub fn layout_document(
    doc: &Document,
    fonts: &FontSet,
    metrics: &LayoutMetrics,
    typography: &Typography,
    options: &RenderOptions,
) -> LaidOutDocument {
    let mut paginator = Paginator::new(metrics);

    if !doc.title.trim().is_empty() {
        draw_title_block(
            &mut paginator,
            &doc.title,
            typography.document_title,
            metrics.document_title_height,
            0.0,
            fonts,
        );
    }

    for (si, section) in doc.sections.iter().enumerate() {
        paginator.skip(metrics.section_spacing);
        if !section.title.trim().is_empty() {
            let height = draw_title_block(
                &mut paginator,
                &section.title,
                typography.section_title,
                metrics.section_title_height,
                table::leading_height(&section.table, fonts, metrics, typography),
                fonts,
            );
            if height > metrics.content_height() {
                paginator.warn(Warning::OversizedTitle {
                    section: si,
                    height,
                    available: metrics.content_height(),
                });
            }
        }
        table::render_table(
            &mut paginator,
            si,
            &section.table,
            fonts,
            typography,
            options,
        );
    }

    let (pages, warnings) = paginator.finish();
    LaidOutDocument {
        title: doc.title.clone(),
        pages,
        warnings,
    }
}

/// Immutable render configuration. Every call builds its own page set, so one
/// renderer can serve several threads at once.
pub struct Renderer {
    fonts: FontSet,
    metrics: LayoutMetrics,
    typography: Typography,
    options: RenderOptions,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(FontSet::default())
    }
}

impl Renderer {
    pub fn new(fonts: FontSet) -> Self {
        Self {
            fonts,
            metrics: LayoutMetrics::default(),
            typography: Typography::default(),
            options: RenderOptions::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: LayoutMetrics) -> Result<Self> {
        metrics.validate()?;
        self.metrics = metrics;
        Ok(self)
    }

    pub fn with_typography(mut self, typography: Typography) -> Self {
        self.typography = typography;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn typography(&self) -> &Typography {
        &self.typography
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn layout(&self, doc: &Document) -> LaidOutDocument {
        layout_document(
            doc,
            &self.fonts,
            &self.metrics,
            &self.typography,
            &self.options,
        )
    }

    pub fn stamp_footers(&self, laid_out: LaidOutDocument) -> PaginatedDocument {
        stamp_footers(
            laid_out,
            &self.fonts,
            &self.metrics,
            &self.typography,
            &self.options,
        )
    }

    /// Layout followed by the footer pass.
    pub fn render(&self, doc: &Document) -> PaginatedDocument {
        self.stamp_footers(self.layout(doc))
    }

    pub fn write_pdf(&self, doc: &PaginatedDocument) -> Result<Vec<u8>> {
        writer::write_pdf(doc, &self.fonts, &self.metrics)
    }

    pub fn render_pdf(&self, doc: &Document) -> Result<Vec<u8>> {
        self.write_pdf(&self.render(doc))
    }
}
