//! PDF decoding: per-page text and images.
//!
//! A [`PageSource`] yields one [`PageExtraction`] per page. [`PdfDecoder`] is
//! the lopdf-backed implementation; [`MemorySource`] serves pages built in
//! memory.

mod content;
mod pdf;
mod xobject;

pub use content::{LayoutWalker, PageLayout, Placement};
pub use pdf::PdfDecoder;
pub use xobject::{encode_png, is_image, to_png};

use crate::error::{Error, Result};
use crate::model::PageExtraction;

/// Anything that can produce decoded pages in document order.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Decode a single page (1-indexed).
    fn decode_page(&self, page_number: u32) -> Result<PageExtraction>;

    /// Decode every page, stopping at the first failure.
    fn pages(&self) -> Result<Vec<PageExtraction>> {
        (1..=self.page_count() as u32)
            .map(|n| self.decode_page(n))
            .collect()
    }
}

/// Pages that were decoded elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<PageExtraction>,
}

impl MemorySource {
    pub fn new(pages: Vec<PageExtraction>) -> Self {
        Self { pages }
    }
}

impl PageSource for MemorySource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn decode_page(&self, page_number: u32) -> Result<PageExtraction> {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .cloned()
            .ok_or_else(|| Error::Other(format!("page {} out of range", page_number)))
    }
}

/// Options for decoding PDF documents.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Error handling mode for individual pages and images
    pub error_mode: ErrorMode,

    /// Whether to extract embedded images
    pub extract_images: bool,
}

impl DecodeOptions {
    /// Create new decode options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail the whole run on the first unreadable page.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Replace unreadable pages with empty ones instead of failing.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Extract text only.
    pub fn text_only(mut self) -> Self {
        self.extract_images = false;
        self
    }

    /// Apply the error mode to the result of decoding page `page_number`.
    pub fn recover(
        &self,
        page_number: u32,
        decoded: Result<PageExtraction>,
    ) -> Result<PageExtraction> {
        match decoded {
            Err(e) if self.error_mode == ErrorMode::Lenient => {
                log::warn!("Failed to decode page {}: {}", page_number, e);
                Ok(PageExtraction::new(page_number, ""))
            }
            other => other,
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            extract_images: true,
        }
    }
}

/// Error handling mode during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any page error
    #[default]
    Strict,
    /// Keep going with an empty page and a warning
    Lenient,
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(
            decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]),
            "Hi"
        );
    }

    #[test]
    fn test_decode_options_builder() {
        let options = DecodeOptions::new().strict().text_only();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(!options.extract_images);

        let defaults = DecodeOptions::default();
        assert_eq!(defaults.error_mode, ErrorMode::Strict);
        assert!(defaults.extract_images);
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new(vec![PageExtraction::new(1, "1. Hi")]);
        assert_eq!(source.page_count(), 1);
        assert_eq!(source.pages().unwrap()[0].raw_text, "1. Hi");
        assert!(source.decode_page(0).is_err());
        assert!(source.decode_page(2).is_err());
    }

    /// Fails on one page.
    struct BrokenPage(u32);

    impl PageSource for BrokenPage {
        fn page_count(&self) -> usize {
            3
        }

        fn decode_page(&self, page_number: u32) -> Result<PageExtraction> {
            if page_number == self.0 {
                return Err(Error::PdfParse("bad content stream".into()));
            }
            Ok(PageExtraction::new(page_number, "1. Hi"))
        }
    }

    #[test]
    fn test_page_error_fails_pages() {
        let result = BrokenPage(2).pages();
        assert!(matches!(result, Err(Error::PdfParse(_))));
    }

    #[test]
    fn test_recover() {
        let strict = DecodeOptions::default();
        let lenient = DecodeOptions::new().lenient();
        let failed = || Err(Error::PdfParse("bad".into()));

        assert!(strict.recover(2, failed()).is_err());
        let page = lenient.recover(2, failed()).unwrap();
        assert_eq!(page.page_index, 2);
        assert!(page.raw_text.is_empty());
    }
}
