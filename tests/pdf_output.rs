mod common;

use rayon::prelude::*;
use report_pdf::{Error, FontFace, FontSet, LayoutMetrics, Renderer, parse_report};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn output_is_a_pdf() {
    init_logger();
    let bytes = Renderer::default()
        .render_pdf(&common::incident_report())
        .expect("render");
    assert!(bytes.starts_with(b"%PDF-"));
    let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(32)..]);
    assert!(tail.contains("%%EOF"), "{tail:?}");
}

#[test]
fn identical_input_gives_identical_bytes() {
    let r = Renderer::default();
    let doc = common::incident_report();
    let first = r.render(&doc);
    let second = r.render(&doc);
    assert_eq!(first.page_count(), second.page_count());
    assert_eq!(common::placements(&first), common::placements(&second));

    let a = r.render_pdf(&doc).expect("first render");
    let b = r.render_pdf(&doc).expect("second render");
    assert_eq!(a, b);
}

#[test]
fn one_renderer_serves_many_threads() {
    let r = Renderer::default();
    let doc = common::incident_report();
    let expected = r.render_pdf(&doc).expect("render");

    let outputs: Vec<Vec<u8>> = (0..8)
        .into_par_iter()
        .map(|_| r.render_pdf(&doc).expect("parallel render"))
        .collect();
    assert!(outputs.iter().all(|o| *o == expected));
}

#[test]
fn letter_pages_use_the_letter_media_box() {
    let r = Renderer::default()
        .with_metrics(LayoutMetrics::letter())
        .expect("valid metrics");
    let bytes = r.render_pdf(&common::incident_report()).expect("render");
    let text = String::from_utf8_lossy(&bytes);
    let start = text.find("/MediaBox [").expect("media box") + "/MediaBox [".len();
    let end = start + text[start..].find(']').expect("closed array");
    let values: Vec<f32> = text[start..end]
        .split_whitespace()
        .map(|v| v.parse().expect("number"))
        .collect();
    assert_eq!(values.len(), 4);
    assert!((values[2] - 612.0).abs() < 0.01);
    assert!((values[3] - 792.0).abs() < 0.01);
}

#[test]
fn sectioned_json_is_read_as_is() {
    let json = br#"{
        "title": "Shelter Census",
        "sections": [
            {
                "title": "Totals",
                "table": {
                    "header": ["Site", "Occupancy"],
                    "rows": [
                        {"label": "North school", "value": "212"},
                        {"label": "Civic hall"}
                    ]
                }
            }
        ]
    }"#;
    let doc = parse_report(json).expect("parse");
    assert_eq!(doc.title, "Shelter Census");
    assert_eq!(doc.sections.len(), 1);
    let table = &doc.sections[0].table;
    assert_eq!(table.header, ["Site".to_string(), "Occupancy".to_string()]);
    assert_eq!(table.rows[1].label, "Civic hall");
    assert_eq!(table.rows[1].value, "");
}

#[test]
fn flat_json_becomes_overview_and_items() {
    let json = br#"{
        "title": "Glossary",
        "totalItems": 2,
        "summary": "Terms used by field teams",
        "items": [
            {"term": "EOC", "definition": "Emergency operations centre"},
            {"term": "Staging area", "definition": "Assembly point for incoming crews"}
        ]
    }"#;
    let doc = parse_report(json).expect("parse");
    assert_eq!(doc.sections.len(), 2);

    let overview = &doc.sections[0];
    assert_eq!(overview.title, "Overview");
    let rows: Vec<(&str, &str)> = overview
        .table
        .rows
        .iter()
        .map(|r| (r.label.as_str(), r.value.as_str()))
        .collect();
    assert_eq!(
        rows,
        [("Total items", "2"), ("Summary", "Terms used by field teams")]
    );

    let items = &doc.sections[1];
    assert_eq!(items.table.header, ["Term".to_string(), "Definition".to_string()]);
    assert_eq!(items.table.rows.len(), 2);
    assert_eq!(items.table.rows[0].label, "EOC");
}

#[test]
fn flat_json_without_summary_skips_the_row() {
    let json = br#"{"title": "Empty list", "totalItems": 0, "items": []}"#;
    let doc = parse_report(json).expect("parse");
    assert_eq!(doc.sections[0].table.rows.len(), 1);
    assert!(doc.sections[1].table.rows.is_empty());

    let out = Renderer::default().render(&doc);
    assert_eq!(out.page_count(), 1);
    assert!(out.warnings().is_empty());
}

#[test]
fn malformed_json_is_an_input_error() {
    let err = parse_report(b"{\"title\": 3}").expect_err("must fail");
    assert!(matches!(err, Error::InvalidInput(_)), "{err}");
}

#[test]
fn bad_metrics_are_rejected() {
    let negative = LayoutMetrics {
        margin_top: -1.0,
        ..LayoutMetrics::a4()
    };
    let no_room = LayoutMetrics {
        margin_left: 105.0,
        margin_right: 105.0,
        ..LayoutMetrics::a4()
    };
    let flat = LayoutMetrics {
        line_height: 0.0,
        ..LayoutMetrics::a4()
    };
    for metrics in [negative, no_room, flat] {
        let result = Renderer::default().with_metrics(metrics);
        assert!(matches!(result, Err(Error::InvalidLayout(_))));
    }
}

#[test]
fn unreadable_fonts_are_measurement_errors() {
    let missing = std::env::temp_dir().join("report-pdf-no-such-font.ttf");
    let err = FontSet::from_files(&missing, None).expect_err("missing font");
    assert!(matches!(err, Error::Measurement(_)), "{err}");

    let err = FontFace::from_bytes(b"not a font".to_vec(), 0).expect_err("garbage font");
    assert!(matches!(err, Error::Measurement(_)), "{err}");
}

#[test]
fn file_name_follows_the_title() {
    let mut doc = common::document("Flood: North/East", vec![]);
    assert_eq!(doc.file_name(), "Flood_ North_East.pdf");
    doc.title = "   ".to_string();
    assert_eq!(doc.file_name(), "report.pdf");
}

#[test]
fn convert_writes_the_requested_file() {
    init_logger();
    let dir = std::env::temp_dir().join(format!("report-pdf-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let input = dir.join("input.json");
    let output = dir.join("out.pdf");
    std::fs::write(
        &input,
        br#"{"title": "Roll call", "totalItems": 1, "items": [{"term": "A", "definition": "B"}]}"#,
    )
    .expect("write input");

    let written = report_pdf::convert_report_to_pdf(&Renderer::default(), &input, Some(&output))
        .expect("convert");
    assert_eq!(written, output);
    let bytes = std::fs::read(&output).expect("read output");
    assert!(bytes.starts_with(b"%PDF-"));

    let missing = report_pdf::convert_report_to_pdf(
        &Renderer::default(),
        &dir.join("absent.json"),
        Some(&output),
    );
    assert!(matches!(missing, Err(Error::Io(_))));

    let _ = std::fs::remove_dir_all(&dir);
}
