//! Line normalization and page furniture removal.

use regex::Regex;
use std::ops::Range;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Cleans individual text lines before they are classified.
pub struct LineNormalizer {
    page_number: Regex,
}

impl LineNormalizer {
    pub fn new() -> Self {
        Self {
            page_number: Regex::new(r"^\s*[-–—]?\s*\d+\s*[-–—]?\s*$")
                .expect("page number pattern is valid"),
        }
    }

    /// NFC-normalize, expand ligatures, drop private-use and replacement
    /// characters, and trim.
    pub fn normalize(&self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        for c in line.nfc() {
            if let Some((_, expanded)) = LIGATURES.iter().find(|(lig, _)| *lig == c) {
                out.push_str(expanded);
            } else if !is_junk(c) {
                out.push(c);
            }
        }
        out.trim().to_string()
    }

    /// Whether the line holds nothing but a page number such as `12` or `- 3 -`.
    pub fn is_page_number(&self, line: &str) -> bool {
        self.page_number.is_match(line)
    }

    /// Byte range of `text` without a page-number line at its top or bottom.
    pub fn content_range(&self, text: &str) -> Range<usize> {
        let mut lines = line_spans(text).filter(|r| !text[r.clone()].trim().is_empty());

        let first = lines.next();
        let last = lines.last().or_else(|| first.clone());

        let mut range = 0..text.len();
        if let Some(first) = first {
            if self.is_page_number(&text[first.clone()]) {
                range.start = first.end;
            }
        }
        if let Some(last) = last {
            if last.start >= range.start && self.is_page_number(&text[last.clone()]) {
                range.end = last.start;
            }
        }
        if range.start > range.end {
            range.end = range.start;
        }
        range
    }
}

impl Default for LineNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_junk(c: char) -> bool {
    let code = c as u32;
    c == '\u{FFFD}'
        || (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

/// Byte ranges of each line in `text`, excluding the newline.
pub(crate) fn line_spans(text: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    let mut start = 0;
    std::iter::from_fn(move || {
        if start > text.len() || (start == text.len() && !text.is_empty()) {
            return None;
        }
        let end = text[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(text.len());
        let span = start..end;
        start = end + 1;
        Some(span)
    })
}
