mod config;
mod error;
mod fonts;
mod model;
pub mod pdf;

pub use config::{
    A4_HEIGHT, A4_WIDTH, FontRole, LETTER_HEIGHT, LETTER_WIDTH, LayoutMetrics, MM_TO_PT,
    PT_TO_MM, RenderOptions, TextStyle, Typography,
};
pub use error::{Error, Result, Warning};
pub use fonts::{FontFace, FontSet};
pub use model::{Document, FlatReport, HARD_BREAK, Item, ReportInput, Row, Section, Table, parse_report};
pub use pdf::layout::{WrapLines, WrappedCell, WrappedLine, wrap};
pub use pdf::page::{DrawOp, Footer, Page, Paint, RowPlacement};
pub use pdf::table::row_height;
pub use pdf::{LaidOutDocument, PaginatedDocument, Renderer, layout_document, stamp_footers};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Render a JSON report file to PDF. Without an explicit `output`, the file is
/// written as `<title>.pdf` in the current directory. Returns the written path.
pub fn convert_report_to_pdf(
    renderer: &Renderer,
    input: &Path,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let t0 = Instant::now();

    let data = std::fs::read(input).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", e, input.display()),
        ))
    })?;
    let doc = parse_report(&data)?;
    let t_parse = t0.elapsed();

    let laid_out = renderer.layout(&doc);
    let t_layout = t0.elapsed();

    let paginated = renderer.stamp_footers(laid_out);
    let t_footers = t0.elapsed();

    let bytes = renderer.write_pdf(&paginated)?;
    let t_render = t0.elapsed();

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(doc.file_name()),
    };
    std::fs::write(&output, &bytes)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, layout={:.1}ms, footers={:.1}ms, pdf={:.1}ms, write={:.1}ms, total={:.1}ms ({} pages, {} warnings, output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_layout - t_parse).as_secs_f64() * 1000.0,
        (t_footers - t_layout).as_secs_f64() * 1000.0,
        (t_render - t_footers).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        paginated.page_count(),
        paginated.warnings().len(),
        bytes.len(),
    );

    Ok(output)
}
