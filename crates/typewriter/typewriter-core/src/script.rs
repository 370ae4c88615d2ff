//! Scripts: the ordered lines a typewriter can display.
//!
//! Reveal and erase step over extended grapheme clusters, so a flag emoji or
//! an accented letter built from combining marks appears in a single tick.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::TypewriterError;

/// One script entry with its grapheme boundaries precomputed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    text: String,
    /// Byte offset of the end of each grapheme cluster, in scan order.
    ends: Vec<usize>,
}

impl Line {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let ends = text
            .grapheme_indices(true)
            .map(|(start, g)| start + g.len())
            .collect();
        Self { text, ends }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of user-perceived characters.
    pub fn grapheme_len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// The first `n` graphemes; `n` is clamped to the line length.
    pub fn prefix(&self, n: usize) -> &str {
        match n.min(self.ends.len()) {
            0 => "",
            k => &self.text[..self.ends[k - 1]],
        }
    }
}

/// Non-empty ordered list of lines. Index 0 is the default line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    lines: Vec<Line>,
}

impl Script {
    pub fn new<I, T>(lines: I) -> Result<Self, TypewriterError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let lines: Vec<Line> = lines.into_iter().map(Line::new).collect();
        if lines.is_empty() {
            return Err(TypewriterError::EmptyScript);
        }
        Ok(Self { lines })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Result<&Line, TypewriterError> {
        self.lines
            .get(index)
            .ok_or(TypewriterError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            })
    }
}
