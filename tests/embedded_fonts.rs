mod common;

use std::path::{Path, PathBuf};

use report_pdf::{Error, FontFace, FontSet, Renderer, TextStyle, Typography};

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::env::var("REPORT_PDF_FONTS")
        .map(|v| std::env::split_paths(&v).collect())
        .unwrap_or_default();
    dirs.extend(
        [
            "/usr/share/fonts",
            "/usr/local/share/fonts",
            "/Library/Fonts",
            "/System/Library/Fonts",
            "C:\\Windows\\Fonts",
        ]
        .map(PathBuf::from),
    );
    dirs
}

/// A regular, upright face with Latin coverage, or `None` on machines without
/// system fonts.
fn find_regular_font() -> Option<PathBuf> {
    let mut stack = font_dirs();
    stack.reverse();
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();
        for path in paths {
            if path.is_dir() {
                stack.push(path);
            } else if is_usable_font(&path) {
                return Some(path);
            }
        }
    }
    None
}

fn is_usable_font(path: &Path) -> bool {
    let is_ttf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttf"));
    if !is_ttf {
        return false;
    }
    let Ok(data) = std::fs::read(path) else {
        return false;
    };
    let Ok(face) = ttf_parser::Face::parse(&data, 0) else {
        return false;
    };
    !face.is_bold()
        && !face.is_italic()
        && "Page |0123456789 abcdefghijklmnopqrstuvwxyz"
            .chars()
            .all(|c| face.glyph_index(c).is_some())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

macro_rules! require_font {
    () => {
        match find_regular_font() {
            Some(path) => path,
            None => {
                eprintln!("no system TrueType font found, skipping");
                return;
            }
        }
    };
}

#[test]
fn widths_follow_the_font_advances() {
    let path = require_font!();
    let face = FontFace::from_file(&path).expect("load font");
    assert!(!face.is_builtin());

    let data = std::fs::read(&path).expect("read font");
    let parsed = ttf_parser::Face::parse(&data, 0).expect("parse font");
    let units = parsed.units_per_em() as f32;
    let text = "Shelter 42 | page";
    let advance: f32 = text
        .chars()
        .map(|c| {
            let gid = parsed.glyph_index(c).expect("covered glyph");
            parsed.glyph_hor_advance(gid).unwrap_or(0) as f32 / units * 1000.0
        })
        .sum();
    let expected = advance * 10.0 / 1000.0 * 25.4 / 72.0;
    assert!(
        (face.text_width(text, 10.0) - expected).abs() < 1e-3,
        "{} vs {expected}",
        face.text_width(text, 10.0)
    );
}

#[test]
fn embedded_font_output_is_deterministic() {
    let path = require_font!();
    let fonts = FontSet::from_files(&path, None).expect("load font set");
    let renderer = Renderer::new(fonts);
    let doc = common::incident_report();

    let a = renderer.render_pdf(&doc).expect("first render");
    let b = renderer.render_pdf(&doc).expect("second render");
    assert_eq!(a, b);
    for marker in [
        &b"/Type0"[..],
        &b"/Identity-H"[..],
        &b"/ToUnicode"[..],
        &b"/FontFile2"[..],
    ] {
        assert!(
            contains(&a, marker),
            "missing {}",
            String::from_utf8_lossy(marker)
        );
    }
    assert!(!contains(&a, b"/Helvetica"));
}

#[test]
fn layout_measures_with_the_loaded_face() {
    let path = require_font!();
    let renderer = Renderer::new(FontSet::from_files(&path, None).expect("load font set"));
    let metrics = renderer.metrics().clone();
    let typography = Typography::default();

    let out = renderer.render(&common::incident_report());
    assert!(out.warnings().is_empty(), "{:?}", out.warnings());
    for page in out.pages() {
        for p in &page.rows {
            assert!(p.bottom() <= metrics.content_bottom() + 1e-3);
        }
    }

    // The footer's right edge lands on the right margin with this face's widths.
    let footer_style: TextStyle = typography.footer;
    for page in out.pages() {
        let Some(report_pdf::DrawOp::Text { x, text, .. }) = page.ops.last() else {
            panic!("page {} does not end with its footer", page.index);
        };
        let right = x + renderer.fonts().text_width(text, &footer_style);
        assert!((right - (metrics.page_width - metrics.margin_right)).abs() < 1e-3);
    }
}

#[test]
fn family_lookup_finds_a_scanned_font() {
    let path = require_font!();
    let face = FontFace::from_file(&path).expect("load font");
    if face.name() == "Embedded" {
        return;
    }
    // The same family may resolve to another file of the same weight.
    let set = FontSet::from_family(face.name()).expect("family resolved from scanned dirs");
    assert!(set.regular.name().eq_ignore_ascii_case(face.name()));
}

#[test]
fn unknown_family_is_a_measurement_error() {
    let err = FontSet::from_family("no such family 7f3a").expect_err("missing family");
    assert!(matches!(err, Error::Measurement(_)), "{err}");
}
