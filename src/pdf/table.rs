use crate::config::{LayoutMetrics, RenderOptions, Typography};
use crate::error::Warning;
use crate::fonts::FontSet;
use crate::model::{Row, Table};

use super::layout::WrappedCell;
use super::page::{DrawOp, Paint, RowPlacement};
use super::paginate::{Paginator, Placement};

/// `max(min_row_height, label_lines * line_height, value_lines * line_height + padding)`
/// where the padding only applies to values spanning more than one line.
pub fn row_height(label_lines: usize, value_lines: usize, metrics: &LayoutMetrics) -> f32 {
    let value_padding = value_padding(value_lines, metrics);
    metrics
        .header_row_height
        .max(label_lines as f32 * metrics.line_height)
        .max(value_lines as f32 * metrics.line_height + value_padding)
}

fn value_padding(value_lines: usize, metrics: &LayoutMetrics) -> f32 {
    if value_lines > 1 {
        metrics.multiline_value_padding
    } else {
        0.0
    }
}

pub(super) struct RowLayout {
    label: WrappedCell,
    value: WrappedCell,
    height: f32,
}

pub(super) fn measure_row(
    row: &Row,
    fonts: &FontSet,
    metrics: &LayoutMetrics,
    typography: &Typography,
) -> RowLayout {
    let text_w = metrics.cell_text_width();
    let label_style = &typography.row_label;
    let value_style = &typography.row_value;
    let label = WrappedCell::wrap(
        &row.label,
        text_w,
        fonts.face(label_style.font),
        label_style.size,
    );
    let value = WrappedCell::wrap(
        &row.value,
        text_w,
        fonts.face(value_style.font),
        value_style.size,
    );
    let height = row_height(label.line_count(), value.line_count(), metrics);
    RowLayout {
        label,
        value,
        height,
    }
}

/// Height of a table's header together with its first row. A header is never
/// left at the bottom of a page without a row under it.
pub(super) fn leading_height(
    table: &Table,
    fonts: &FontSet,
    metrics: &LayoutMetrics,
    typography: &Typography,
) -> f32 {
    let first_row = table
        .rows
        .first()
        .map_or(0.0, |row| measure_row(row, fonts, metrics, typography).height);
    metrics.header_row_height + first_row
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn draw_header(
    paginator: &mut Paginator,
    section: usize,
    header: &[String; 2],
    fonts: &FontSet,
    typography: &Typography,
) {
    let m = paginator.metrics();
    let top = paginator.cursor_y();
    paginator.draw(DrawOp::Rect {
        x: m.margin_left,
        y: top,
        width: m.content_width(),
        height: m.header_row_height,
        paint: Paint::Fill(typography.table_header_fill),
    });

    let style = typography.table_header;
    let baseline = top + m.header_row_height * 0.7;
    for (raw, col_x) in header
        .iter()
        .zip([m.label_column_x(), m.value_column_x()])
    {
        // Header cells are one line tall; hard breaks fold into spaces.
        let text = single_line(raw);
        if fonts.text_width(&text, &style) > m.cell_text_width() {
            paginator.warn(Warning::HeaderOverflow {
                section,
                text: text.clone(),
            });
        }
        paginator.draw(DrawOp::Text {
            x: col_x + m.cell_padding,
            y: baseline,
            text,
            style,
        });
    }
    paginator.advance(m.header_row_height);
}

fn draw_row(paginator: &mut Paginator, layout: &RowLayout, typography: &Typography) {
    let m = paginator.metrics();
    let top = paginator.cursor_y();
    let border = Paint::Stroke {
        color: typography.border_color,
        line_width: typography.border_width,
    };
    paginator.draw(DrawOp::Rect {
        x: m.margin_left,
        y: top,
        width: m.content_width(),
        height: layout.height,
        paint: border,
    });
    paginator.draw(DrawOp::Line {
        x1: m.value_column_x(),
        y1: top,
        x2: m.value_column_x(),
        y2: top + layout.height,
        color: typography.border_color,
        line_width: typography.border_width,
    });

    for (cell, col_x, style) in [
        (&layout.label, m.label_column_x(), typography.row_label),
        (&layout.value, m.value_column_x(), typography.row_value),
    ] {
        for (i, line) in cell.lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            paginator.draw(DrawOp::Text {
                x: col_x + m.cell_padding,
                y: top + (i + 1) as f32 * m.line_height,
                text: line.text.clone(),
                style,
            });
        }
    }
    paginator.advance(layout.height);
}

/// Place a table: header once, then each row whole on one page.
pub(super) fn render_table(
    paginator: &mut Paginator,
    section: usize,
    table: &Table,
    fonts: &FontSet,
    typography: &Typography,
    options: &RenderOptions,
) {
    let m = paginator.metrics();

    paginator.reserve(leading_height(table, fonts, m, typography));
    draw_header(paginator, section, &table.header, fonts, typography);

    for (ri, row) in table.rows.iter().enumerate() {
        let layout = measure_row(row, fonts, m, typography);
        for line in layout
            .label
            .overflowing(m.cell_text_width())
            .chain(layout.value.overflowing(m.cell_text_width()))
        {
            paginator.warn(Warning::OversizedToken {
                token: line.text.clone(),
                width: line.width,
                max_width: m.cell_text_width(),
            });
        }

        let placement = paginator.reserve(layout.height);
        if placement == Placement::NewPage && options.repeat_table_header {
            // A row that fits an empty page but not under a header goes without one.
            if paginator.fits(m.header_row_height + layout.height) {
                draw_header(paginator, section, &table.header, fonts, typography);
            } else {
                paginator.warn(Warning::HeaderNotRepeated {
                    section,
                    row: ri,
                    height: layout.height,
                });
            }
        }
        if layout.height > m.content_height() {
            paginator.warn(Warning::OversizedRow {
                section,
                row: ri,
                height: layout.height,
                available: m.content_height(),
            });
        }

        log::debug!(
            "TABLE section={} row={} row_h={:.2} label_lines={} value_lines={} page={} y={:.2}",
            section,
            ri,
            layout.height,
            layout.label.line_count(),
            layout.value.line_count(),
            paginator.page_index(),
            paginator.cursor_y()
        );

        paginator.record_row(RowPlacement {
            section,
            row: ri,
            page: paginator.page_index(),
            top: paginator.cursor_y(),
            height: layout.height,
            label_lines: layout.label.line_count(),
            value_lines: layout.value.line_count(),
        });
        draw_row(paginator, &layout, typography);
    }
}
