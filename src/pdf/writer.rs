use std::collections::{HashMap, HashSet};

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::config::{FontRole, LayoutMetrics, MM_TO_PT};
use crate::error::{Error, Result};
use crate::fonts::{EmbeddedFont, FontSet};

use super::PaginatedDocument;
use super::page::{DrawOp, Page, Paint};

const FONT_ORDER: [FontRole; 2] = [FontRole::Regular, FontRole::Bold];

fn rgb(color: [u8; 3]) -> (f32, f32, f32) {
    (
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
    )
}

/// Converts top-down layout units into PDF user space (points, y up).
struct Projection {
    page_height_pt: f32,
}

impl Projection {
    fn len(&self, v: f32) -> f32 {
        v * MM_TO_PT
    }

    fn y(&self, v: f32) -> f32 {
        self.page_height_pt - v * MM_TO_PT
    }
}

fn page_content(
    page: &Page,
    proj: &Projection,
    embedded: &HashMap<FontRole, EmbeddedFont>,
) -> Result<Content> {
    let mut content = Content::new();
    for op in &page.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                paint,
            } => {
                content.save_state();
                match *paint {
                    Paint::Stroke { color, line_width } => {
                        let (r, g, b) = rgb(color);
                        content.set_stroke_rgb(r, g, b);
                        content.set_line_width(line_width);
                    }
                    Paint::Fill(color) => {
                        let (r, g, b) = rgb(color);
                        content.set_fill_rgb(r, g, b);
                    }
                }
                content.rect(
                    proj.len(*x),
                    proj.y(y + height),
                    proj.len(*width),
                    proj.len(*height),
                );
                match paint {
                    Paint::Stroke { .. } => content.stroke(),
                    Paint::Fill(_) => content.fill_nonzero(),
                };
                content.restore_state();
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                line_width,
            } => {
                let (r, g, b) = rgb(*color);
                content.save_state();
                content.set_stroke_rgb(r, g, b);
                content.set_line_width(*line_width);
                content.move_to(proj.len(*x1), proj.y(*y1));
                content.line_to(proj.len(*x2), proj.y(*y2));
                content.stroke();
                content.restore_state();
            }
            DrawOp::Text { x, y, text, style } => {
                let font = embedded.get(&style.font).ok_or_else(|| {
                    Error::Serialization(format!("no font registered for {:?}", style.font))
                })?;
                let (r, g, b) = rgb(style.color);
                content.save_state();
                content.set_fill_rgb(r, g, b);
                content.begin_text();
                content.set_font(Name(font.pdf_name.as_bytes()), style.size);
                content.next_line(proj.len(*x), proj.y(*y));
                content.show(Str(&font.encode(text)));
                content.end_text();
                content.restore_state();
            }
        }
    }
    Ok(content)
}

/// Serialize a footer-stamped document. Output is byte-for-byte stable for
/// identical input: no timestamps, fonts and glyphs in a fixed order.
pub(super) fn write_pdf(
    doc: &PaginatedDocument,
    fonts: &FontSet,
    metrics: &LayoutMetrics,
) -> Result<Vec<u8>> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    let mut used_chars: HashMap<FontRole, HashSet<char>> = HashMap::new();
    for page in doc.pages() {
        for op in &page.ops {
            if let DrawOp::Text { text, style, .. } = op {
                let chars = used_chars.entry(style.font).or_default();
                chars.extend(text.chars());
                chars.insert(' ');
            }
        }
    }

    let mut embedded: HashMap<FontRole, EmbeddedFont> = HashMap::new();
    for (i, role) in FONT_ORDER.into_iter().enumerate() {
        let Some(chars) = used_chars.get(&role) else {
            continue;
        };
        let font_ref = alloc();
        let entry = fonts
            .face(role)
            .embed(&mut pdf, font_ref, format!("F{}", i + 1), chars, &mut alloc)?;
        embedded.insert(role, entry);
    }
    let t_fonts = t0.elapsed();

    let n = doc.page_count();
    let page_count = i32::try_from(n)
        .map_err(|_| Error::Serialization(format!("{n} pages exceed the PDF page limit")))?;
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    let proj = Projection {
        page_height_pt: metrics.page_height * MM_TO_PT,
    };
    for (page, &content_id) in doc.pages().iter().zip(&content_ids) {
        let raw = page_content(page, &proj, &embedded)?.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_count);

    let font_pairs: Vec<(&str, Ref)> = FONT_ORDER
        .iter()
        .filter_map(|role| embedded.get(role))
        .map(|e| (e.pdf_name.as_str(), e.font_ref))
        .collect();
    let media_box = Rect::new(
        0.0,
        0.0,
        metrics.page_width * MM_TO_PT,
        metrics.page_height * MM_TO_PT,
    );
    for (&page_id, &content_id) in page_ids.iter().zip(&content_ids) {
        let mut page = pdf.page(page_id);
        page.media_box(media_box)
            .parent(pages_id)
            .contents(content_id);
        let mut resources = page.resources();
        let mut font_dict = resources.fonts();
        for &(name, font_ref) in &font_pairs {
            font_dict.pair(Name(name.as_bytes()), font_ref);
        }
    }

    let info_id = alloc();
    let mut info = pdf.document_info(info_id);
    if !doc.title().is_empty() {
        info.title(TextStr(doc.title()));
    }
    info.producer(TextStr(concat!("report-pdf ", env!("CARGO_PKG_VERSION"))));
    drop(info);

    let bytes = pdf.finish();
    log::info!(
        "PDF write: fonts={:.1}ms, total={:.1}ms, {} pages, {} bytes",
        t_fonts.as_secs_f64() * 1000.0,
        t0.elapsed().as_secs_f64() * 1000.0,
        n,
        bytes.len(),
    );
    Ok(bytes)
}
