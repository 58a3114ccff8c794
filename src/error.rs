use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Font data or metrics unavailable. Layout cannot proceed without widths.
    #[error("Font measurement error: {0}")]
    Measurement(String),

    #[error("Invalid layout metrics: {0}")]
    InvalidLayout(String),

    #[error("Invalid report input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    /// Converting the finished page set to bytes failed; the computed pages are dropped.
    #[error("PDF serialization error: {0}")]
    Serialization(String),
}

/// Non-fatal layout conditions. Rendering continues; the affected content may
/// overflow its column or the page's content band.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// A single token wider than its column; drawn on its own line, overflowing.
    OversizedToken {
        token: String,
        width: f32,
        max_width: f32,
    },
    /// A row taller than an empty page's content band.
    OversizedRow {
        section: usize,
        row: usize,
        height: f32,
        available: f32,
    },
    OversizedTitle { section: usize, height: f32, available: f32 },
    /// A continued table's header was left off a page because the row below it
    /// would no longer fit.
    HeaderNotRepeated { section: usize, row: usize, height: f32 },
    /// Header text that does not fit on a single line of its cell.
    HeaderOverflow { section: usize, text: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::OversizedToken {
                token,
                width,
                max_width,
            } => write!(
                f,
                "token {token:?} is {width:.1} wide, column allows {max_width:.1}"
            ),
            Warning::OversizedRow {
                section,
                row,
                height,
                available,
            } => write!(
                f,
                "section {section} row {row} is {height:.1} tall, page holds {available:.1}"
            ),
            Warning::OversizedTitle {
                section,
                height,
                available,
            } => write!(
                f,
                "section {section} title is {height:.1} tall, page holds {available:.1}"
            ),
            Warning::HeaderNotRepeated {
                section,
                row,
                height,
            } => write!(
                f,
                "section {section} row {row} is {height:.1} tall, no room to repeat the header above it"
            ),
            Warning::HeaderOverflow { section, text } => {
                write!(f, "section {section} header {text:?} overflows its cell")
            }
        }
    }
}
