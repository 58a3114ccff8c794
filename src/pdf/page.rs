use crate::config::TextStyle;

/// How a rectangle is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Stroke { color: [u8; 3], line_width: f32 },
    Fill([u8; 3]),
}

/// One drawing instruction in layout units, y growing downward from the page top.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        paint: Paint,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: [u8; 3],
        line_width: f32,
    },
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
}

impl DrawOp {
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Where a table row ended up.
#[derive(Clone, Debug, PartialEq)]
pub struct RowPlacement {
    pub section: usize,
    pub row: usize,
    pub page: usize,
    pub top: f32,
    pub height: f32,
    pub label_lines: usize,
    pub value_lines: usize,
}

impl RowPlacement {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Footer {
    pub page_number: usize,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub index: usize,
    pub cursor_y: f32,
    pub ops: Vec<DrawOp>,
    pub rows: Vec<RowPlacement>,
    pub footer: Option<Footer>,
}

impl Page {
    pub(crate) fn new(index: usize, cursor_y: f32) -> Self {
        Self {
            index,
            cursor_y,
            ops: Vec::new(),
            rows: Vec::new(),
            footer: None,
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::text)
    }
}
