use std::iter::{FusedIterator, Peekable};
use std::str::SplitWhitespace;

use crate::fonts::FontFace;
use crate::model::HARD_BREAK;

#[derive(Clone, Debug, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub width: f32, // layout units
}

impl WrappedLine {
    fn empty() -> Self {
        Self {
            text: String::new(),
            width: 0.0,
        }
    }
}

/// Lazily wrapped lines of one text segment. Single pass: once drained it
/// yields nothing more, and it cannot be rewound.
pub struct WrapLines<'a> {
    tokens: Peekable<SplitWhitespace<'a>>,
    font: &'a FontFace,
    size: f32,
    max_width: f32,
    space_width: f32,
    yielded_any: bool,
    done: bool,
}

/// Greedily break `text` on whitespace so each line fits `max_width` at `size`
/// points. Runs of whitespace collapse to single spaces. A token wider than
/// `max_width` takes a line of its own and overflows; it is never split.
/// Empty input yields one empty line.
pub fn wrap<'a>(text: &'a str, max_width: f32, font: &'a FontFace, size: f32) -> WrapLines<'a> {
    WrapLines {
        tokens: text.split_whitespace().peekable(),
        font,
        size,
        max_width,
        space_width: font.space_width(size),
        yielded_any: false,
        done: false,
    }
}

impl Iterator for WrapLines<'_> {
    type Item = WrappedLine;

    fn next(&mut self) -> Option<WrappedLine> {
        if self.done {
            return None;
        }
        let Some(first) = self.tokens.next() else {
            self.done = true;
            if self.yielded_any {
                return None;
            }
            self.yielded_any = true;
            return Some(WrappedLine::empty());
        };
        self.yielded_any = true;

        let mut text = first.to_string();
        let mut width = self.font.text_width(first, self.size);
        while let Some(&token) = self.tokens.peek() {
            let token_w = self.font.text_width(token, self.size);
            if width + self.space_width + token_w > self.max_width {
                break;
            }
            text.push(' ');
            text.push_str(token);
            width += self.space_width + token_w;
            self.tokens.next();
        }
        Some(WrappedLine { text, width })
    }
}

impl FusedIterator for WrapLines<'_> {}

/// Cell text after hard breaks and soft wrapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedCell {
    pub lines: Vec<WrappedLine>,
}

impl WrappedCell {
    /// Split `raw` on hard breaks, wrap every segment on its own and concatenate
    /// the results in order. An empty segment contributes one empty line.
    pub fn wrap(raw: &str, max_width: f32, font: &FontFace, size: f32) -> Self {
        let lines = raw
            .split(HARD_BREAK)
            .flat_map(|segment| wrap(segment, max_width, font, size))
            .collect();
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }

    /// Lines wider than `max_width`; only possible for single oversized tokens.
    pub fn overflowing(&self, max_width: f32) -> impl Iterator<Item = &WrappedLine> {
        self.lines.iter().filter(move |l| l.width > max_width)
    }
}
