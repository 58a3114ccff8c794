use crate::config::{LayoutMetrics, RenderOptions, Typography};
use crate::fonts::FontSet;

use super::page::{DrawOp, Footer, Page, Paint};
use super::{LaidOutDocument, PaginatedDocument};

pub fn footer_text(page_number: usize, total_pages: usize, options: &RenderOptions) -> String {
    if options.footer_with_total {
        format!("Page | {page_number} of {total_pages}")
    } else {
        format!("Page | {page_number}")
    }
}

fn stamp_page(
    page: &mut Page,
    total_pages: usize,
    fonts: &FontSet,
    metrics: &LayoutMetrics,
    typography: &Typography,
    options: &RenderOptions,
) {
    let style = typography.footer;
    let face = fonts.face(style.font);
    let text = footer_text(page.index, total_pages, options);
    let width = face.text_width(&text, style.size);
    let ascent = face.ascent(style.size);
    let descent = face.descent(style.size);
    let pad = metrics.footer_padding;

    // Right-aligned to the content edge, centred vertically in the bottom margin.
    let x = metrics.page_width - metrics.margin_right - width;
    let baseline = metrics.page_height - metrics.margin_bottom / 2.0 + (ascent - descent) / 2.0;

    // Erase whatever content reached this zone before drawing the text.
    page.ops.push(DrawOp::Rect {
        x: x - pad,
        y: baseline - ascent - pad,
        width: width + 2.0 * pad,
        height: ascent + descent + 2.0 * pad,
        paint: Paint::Fill(typography.footer_fill),
    });
    page.ops.push(DrawOp::Text {
        x,
        y: baseline,
        text: text.clone(),
        style,
    });
    page.footer = Some(Footer {
        page_number: page.index,
        text,
    });
}

/// Finalization pass: stamp every page with its footer now that the page count
/// is known. Consumes the laid-out pages; the result is read-only.
pub fn stamp_footers(
    doc: LaidOutDocument,
    fonts: &FontSet,
    metrics: &LayoutMetrics,
    typography: &Typography,
    options: &RenderOptions,
) -> PaginatedDocument {
    let LaidOutDocument {
        title,
        mut pages,
        warnings,
    } = doc;
    let total = pages.len();
    for page in &mut pages {
        stamp_page(page, total, fonts, metrics, typography, options);
    }
    log::debug!("stamped footers on {total} pages");
    PaginatedDocument {
        title,
        pages,
        warnings,
    }
}
