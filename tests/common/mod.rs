#![allow(dead_code)]

use report_pdf::{
    Document, FontSet, LayoutMetrics, PaginatedDocument, RowPlacement, Row, Section, Table,
    Typography, WrappedCell,
};

/// A4-wide metrics with a 240-unit content band and integral geometry, so
/// cursor arithmetic in tests is exact.
pub fn exact_metrics() -> LayoutMetrics {
    LayoutMetrics {
        page_height: 280.0,
        margin_top: 20.0,
        margin_bottom: 20.0,
        ..LayoutMetrics::a4()
    }
}

pub fn row(label: &str, value: &str) -> Row {
    Row::new(label, value)
}

pub fn section(title: &str, header: [&str; 2], rows: Vec<Row>) -> Section {
    Section {
        title: title.to_string(),
        table: Table::new(header, rows),
    }
}

pub fn document(title: &str, sections: Vec<Section>) -> Document {
    Document {
        title: title.to_string(),
        sections,
    }
}

/// `n` rows whose label and value each fit on one line (height 10 by default).
pub fn short_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| row(&format!("L{i}"), &format!("v{i}")))
        .collect()
}

/// Value text that wraps to exactly `lines` lines in the value column.
pub fn value_wrapping_to(lines: usize, fonts: &FontSet, metrics: &LayoutMetrics) -> String {
    let style = Typography::default().row_value;
    let face = fonts.face(style.font);
    let mut text = String::from("disaster");
    let words = ["response", "team", "shelter", "supplies", "evacuation", "route"];
    let mut i = 0;
    loop {
        let count = WrappedCell::wrap(&text, metrics.cell_text_width(), face, style.size)
            .line_count();
        if count == lines {
            return text;
        }
        assert!(count < lines, "overshot while building {lines}-line text");
        text.push(' ');
        text.push_str(words[i % words.len()]);
        i += 1;
    }
}

pub fn placements(doc: &PaginatedDocument) -> Vec<&RowPlacement> {
    doc.pages().iter().flat_map(|p| p.rows.iter()).collect()
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn incident_report() -> Document {
    document(
        "Flood Response Summary",
        vec![
            section(
                "Incident",
                ["Field", "Details"],
                vec![
                    row("Reported by", "Dispatcher on duty"),
                    row(
                        "Location",
                        "North river district, sectors 4 through 9, including the low-lying \
                         residential blocks next to the old rail bridge",
                    ),
                    row("Status", "Active\nEvacuation ordered\nShelters open"),
                    row("Notes", ""),
                ],
            ),
            section(
                "Resources",
                ["Group", "Assignment"],
                (0..40)
                    .map(|i| {
                        row(
                            &format!("Community group {i}"),
                            &format!(
                                "Sandbag distribution at depot {i}, then door-to-door checks \
                                 along the assigned street list"
                            ),
                        )
                    })
                    .collect(),
            ),
        ],
    )
}
