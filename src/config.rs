//! Geometry, typography and behaviour settings for a render pass.
//!
//! All geometry is in layout units (millimetres); font sizes are in points.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const A4_WIDTH: f32 = 210.0;
pub const A4_HEIGHT: f32 = 297.0;
pub const LETTER_WIDTH: f32 = 215.9;
pub const LETTER_HEIGHT: f32 = 279.4;

/// Points per layout unit.
pub const MM_TO_PT: f32 = 72.0 / 25.4;
pub const PT_TO_MM: f32 = 25.4 / 72.0;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutMetrics {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub line_height: f32,
    /// Horizontal padding on each side of a cell's text.
    pub cell_padding: f32,
    /// Height of a table header; also the minimum height of any row.
    pub header_row_height: f32,
    /// Extra space below the last line of a value that wraps to several lines.
    pub multiline_value_padding: f32,
    pub document_title_height: f32,
    /// Height of one line of a section title.
    pub section_title_height: f32,
    /// Vertical gap before each section after the first element on the page.
    pub section_spacing: f32,
    /// Gap between footer text and its backing rectangle.
    pub footer_padding: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self::a4()
    }
}

impl LayoutMetrics {
    pub fn a4() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin_top: 25.4,
            margin_bottom: 25.4,
            margin_left: 31.75,
            margin_right: 31.75,
            line_height: 6.0,
            cell_padding: 2.0,
            header_row_height: 10.0,
            multiline_value_padding: 4.0,
            document_title_height: 12.0,
            section_title_height: 10.0,
            section_spacing: 6.0,
            footer_padding: 1.0,
        }
    }

    pub fn letter() -> Self {
        Self {
            page_width: LETTER_WIDTH,
            page_height: LETTER_HEIGHT,
            ..Self::a4()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let metrics: Self = serde_json::from_slice(&data)?;
        metrics.validate()?;
        Ok(metrics)
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Both columns share the content width equally, so their sum is always
    /// exactly the content width.
    pub fn column_width(&self) -> f32 {
        self.content_width() / 2.0
    }

    pub fn label_column_x(&self) -> f32 {
        self.margin_left
    }

    pub fn value_column_x(&self) -> f32 {
        self.margin_left + self.column_width()
    }

    /// Width available to wrapped text inside either column.
    pub fn cell_text_width(&self) -> f32 {
        self.column_width() - 2.0 * self.cell_padding
    }

    pub fn content_top(&self) -> f32 {
        self.margin_top
    }

    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.content_top()
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("margin_left", self.margin_left),
            ("margin_right", self.margin_right),
            ("line_height", self.line_height),
            ("cell_padding", self.cell_padding),
            ("header_row_height", self.header_row_height),
            ("multiline_value_padding", self.multiline_value_padding),
            ("document_title_height", self.document_title_height),
            ("section_title_height", self.section_title_height),
            ("section_spacing", self.section_spacing),
            ("footer_padding", self.footer_padding),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidLayout(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if self.line_height <= 0.0 {
            return Err(Error::InvalidLayout("line_height must be positive".into()));
        }
        if self.cell_text_width() <= 0.0 {
            return Err(Error::InvalidLayout(format!(
                "content width {:.2} leaves no room for cell text with padding {:.2}",
                self.content_width(),
                self.cell_padding
            )));
        }
        if self.content_height() < self.header_row_height {
            return Err(Error::InvalidLayout(format!(
                "content height {:.2} cannot hold a header row of {:.2}",
                self.content_height(),
                self.header_row_height
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontRole {
    Regular,
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font: FontRole,
    pub size: f32, // points
    pub color: [u8; 3],
}

impl TextStyle {
    pub const fn new(font: FontRole, size: f32, color: [u8; 3]) -> Self {
        Self { font, size, color }
    }
}

const BLACK: [u8; 3] = [0, 0, 0];
const WHITE: [u8; 3] = [255, 255, 255];

/// Per-role styling. Passed explicitly into every draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct Typography {
    pub document_title: TextStyle,
    pub section_title: TextStyle,
    pub table_header: TextStyle,
    pub table_header_fill: [u8; 3],
    pub row_label: TextStyle,
    pub row_value: TextStyle,
    pub border_color: [u8; 3],
    pub border_width: f32, // points
    pub footer: TextStyle,
    pub footer_fill: [u8; 3],
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            document_title: TextStyle::new(FontRole::Bold, 16.0, BLACK),
            section_title: TextStyle::new(FontRole::Bold, 13.0, [33, 37, 41]),
            table_header: TextStyle::new(FontRole::Bold, 10.0, WHITE),
            table_header_fill: [52, 73, 94],
            row_label: TextStyle::new(FontRole::Bold, 10.0, BLACK),
            row_value: TextStyle::new(FontRole::Regular, 10.0, BLACK),
            border_color: [160, 160, 160],
            border_width: 0.5,
            footer: TextStyle::new(FontRole::Regular, 9.0, [90, 90, 90]),
            footer_fill: WHITE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderOptions {
    /// Redraw a table's header at the top of every page its rows continue on.
    /// Off by default: the header appears once per table.
    pub repeat_table_header: bool,
    /// Render footers as "Page | n of N" instead of "Page | n".
    pub footer_with_total: bool,
}
