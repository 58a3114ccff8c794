mod common;

use common::{document, exact_metrics, section, short_rows};
use report_pdf::{DrawOp, LayoutMetrics, Paint, RenderOptions, Renderer, Typography};

#[test]
fn exactly_two_full_pages_get_two_footers() {
    // Page 1: header + 23 rows = 240; page 2: 24 rows = 240. Both bands full.
    let doc = document("", vec![section("", ["a", "b"], short_rows(47))]);
    let r = Renderer::default()
        .with_metrics(exact_metrics())
        .expect("valid metrics");

    let laid_out = r.layout(&doc);
    assert_eq!(laid_out.pages.len(), 2);
    assert!(laid_out.pages.iter().all(|p| p.cursor_y == 260.0));
    assert!(laid_out.pages.iter().all(|p| p.footer.is_none()));

    let out = r.stamp_footers(laid_out);
    let footers: Vec<&str> = out
        .pages()
        .iter()
        .filter_map(|p| p.footer.as_ref())
        .map(|f| f.text.as_str())
        .collect();
    assert_eq!(footers, ["Page | 1", "Page | 2"]);
}

#[test]
fn footer_numbers_are_contiguous() {
    let out = Renderer::default().render(&common::incident_report());
    let n = out.page_count();
    assert!(n >= 2);
    let numbers: Vec<usize> = out
        .pages()
        .iter()
        .map(|p| p.footer.as_ref().expect("every page stamped").page_number)
        .collect();
    assert_eq!(numbers, (1..=n).collect::<Vec<_>>());
}

#[test]
fn footer_is_erased_then_drawn_last() {
    let metrics = LayoutMetrics::a4();
    let out = Renderer::default().render(&common::incident_report());
    for page in out.pages() {
        let ops = &page.ops;
        let [.., backing, text] = ops.as_slice() else {
            panic!("page {} has too few ops", page.index);
        };
        let DrawOp::Text { x, y, text, style } = text else {
            panic!("last op is not the footer text");
        };
        assert_eq!(*text, format!("Page | {}", page.index));
        assert_eq!(*style, Typography::default().footer);

        let DrawOp::Rect {
            x: rx,
            y: ry,
            width,
            height,
            paint,
        } = backing
        else {
            panic!("footer text is not preceded by its backing rectangle");
        };
        assert_eq!(*paint, Paint::Fill([255, 255, 255]));
        assert!(rx < x && *ry < *y && ry + height > *y);
        assert!(rx + width >= metrics.page_width - metrics.margin_right);
        // Sits inside the bottom margin, below the content band.
        assert!(*ry >= metrics.content_bottom());
        assert!(ry + height <= metrics.page_height);
    }
}

#[test]
fn totals_variant_knows_the_page_count() {
    let r = Renderer::default().with_options(RenderOptions {
        footer_with_total: true,
        ..RenderOptions::default()
    });
    let out = r.render(&common::incident_report());
    let n = out.page_count();
    for page in out.pages() {
        let footer = page.footer.as_ref().expect("stamped");
        assert_eq!(footer.text, format!("Page | {} of {n}", page.index));
    }
}

#[test]
fn empty_document_still_has_one_numbered_page() {
    let out = Renderer::default().render(&document("Empty", vec![]));
    assert_eq!(out.page_count(), 1);
    assert_eq!(
        out.pages()[0].footer.as_ref().map(|f| f.text.as_str()),
        Some("Page | 1")
    );
}
