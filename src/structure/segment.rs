//! Splitting page text into question-sized chunks.
//!
//! A chunk starts at a line that opens with a question number (`12.` or
//! `12)`) and runs until the next accepted marker or the end of the page.
//! Which numbers count as markers is decided by a [`NumberingPolicy`]; the
//! heuristic can be fooled by numbered lists inside a question body.

use regex::Regex;
use std::ops::Range;

use super::normalize::line_spans;
use super::options::NumberingPolicy;

/// A span of page text presumed to hold one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionChunk<'a> {
    /// Page number (1-indexed)
    pub page_index: u32,

    /// Byte range of the chunk within the page text
    pub span: Range<usize>,

    /// Chunk text, including the marker
    pub text: &'a str,

    /// Question number from the opening marker, `None` for leading text
    pub starting_number: Option<u32>,

    /// Offset within `text` where the body begins (after the marker)
    body_start: usize,
}

impl<'a> QuestionChunk<'a> {
    /// Text after the numbering marker.
    pub fn body(&self) -> &'a str {
        &self.text[self.body_start..]
    }

    /// Whether the chunk holds no visible text.
    pub fn is_blank(&self) -> bool {
        self.body().trim().is_empty()
    }
}

/// Finds numbering markers and splits text on them.
pub struct TextSegmenter {
    marker: Regex,
    policy: NumberingPolicy,
}

impl TextSegmenter {
    pub fn new(policy: NumberingPolicy) -> Self {
        Self {
            marker: Regex::new(r"^\s*(\d{1,3})\s*[.)]\s*").expect("marker pattern is valid"),
            policy,
        }
    }

    /// Parse a numbering marker at the start of `line`.
    ///
    /// Returns the number and the byte length of the marker (including
    /// trailing spaces). A delimiter directly followed by a digit, as in
    /// `3.5 cm`, is not a marker.
    pub fn parse_marker(&self, line: &str) -> Option<(u32, usize)> {
        let caps = self.marker.captures(line)?;
        let whole = caps.get(0)?;
        let digits = caps.get(1)?;

        let delimiter_end = line[digits.end()..]
            .find(&['.', ')'][..])
            .map(|i| digits.end() + i + 1)?;
        if line[delimiter_end..].starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }

        let number = digits.as_str().parse().ok()?;
        Some((number, whole.end()))
    }

    /// Lazily split `text[body]` into chunks.
    ///
    /// `last_number` is the last question number accepted earlier in the
    /// document; the policy uses it to reject stray numbers.
    pub fn segment<'a>(
        &'a self,
        page_index: u32,
        text: &'a str,
        body: Range<usize>,
        last_number: Option<u32>,
    ) -> Segments<'a> {
        let body = body.start.min(text.len())..body.end.min(text.len());
        Segments {
            segmenter: self,
            page_index,
            text,
            base: body.start,
            lines: Box::new(line_spans(&text[body.clone()])),
            end: body.end,
            open: Some(Open {
                start: body.start,
                number: None,
                body_start: 0,
            }),
            last_number,
        }
    }
}

struct Open {
    start: usize,
    number: Option<u32>,
    body_start: usize,
}

/// Single forward pass over a page's text, yielding chunks in order.
pub struct Segments<'a> {
    segmenter: &'a TextSegmenter,
    page_index: u32,
    text: &'a str,
    base: usize,
    lines: Box<dyn Iterator<Item = Range<usize>> + 'a>,
    end: usize,
    open: Option<Open>,
    last_number: Option<u32>,
}

impl<'a> Segments<'a> {
    /// Last question number accepted so far.
    pub fn last_number(&self) -> Option<u32> {
        self.last_number
    }

    fn close(&self, open: Open, end: usize) -> Option<QuestionChunk<'a>> {
        let chunk = QuestionChunk {
            page_index: self.page_index,
            span: open.start..end,
            text: &self.text[open.start..end],
            starting_number: open.number,
            body_start: open.body_start,
        };
        if chunk.starting_number.is_none() && chunk.is_blank() {
            return None;
        }
        Some(chunk)
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = QuestionChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(local) = self.lines.next() {
            let line_start = self.base + local.start;
            let line = &self.text[line_start..self.base + local.end];

            let Some((number, marker_len)) = self.segmenter.parse_marker(line) else {
                continue;
            };
            if !self.segmenter.policy.accepts(number, self.last_number) {
                log::trace!(
                    "page {}: ignoring number {} after {:?}",
                    self.page_index,
                    number,
                    self.last_number
                );
                continue;
            }
            self.last_number = Some(number);

            let previous = self.open.replace(Open {
                start: line_start,
                number: Some(number),
                body_start: marker_len,
            });
            if let Some(chunk) = previous.and_then(|open| self.close(open, line_start)) {
                return Some(chunk);
            }
        }

        let open = self.open.take()?;
        self.close(open, self.end)
    }
}
