//! Per-page decoder output.

use serde::{Deserialize, Serialize};

/// A rectangle in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Vertical midpoint.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }
}

/// An image extracted from a page, already encoded as PNG.
#[derive(Debug, Clone)]
pub struct RawImage {
    /// PNG bytes
    pub bytes: Vec<u8>,

    /// Placement on the page, when the content stream exposed one
    pub bbox: Option<BBox>,

    /// Order of the image on its page (1-indexed)
    pub source_index: u32,

    /// Byte offset into the page text of the first text that follows the
    /// image in reading order. `None` places the image after all text.
    pub anchor: Option<usize>,
}

impl RawImage {
    pub fn new(bytes: Vec<u8>, source_index: u32) -> Self {
        Self {
            bytes,
            bbox: None,
            source_index,
            anchor: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_anchor(mut self, anchor: usize) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Archive filename for this image: `page{N}_image{M}.png`.
    pub fn archive_name(&self, page_index: u32) -> String {
        format!("page{}_image{}.png", page_index, self.source_index)
    }
}

/// Everything the decoder produced for one page.
#[derive(Debug, Clone)]
pub struct PageExtraction {
    /// Page number (1-indexed)
    pub page_index: u32,

    /// Machine-selectable text in reading order, one line per text line
    pub raw_text: String,

    /// Images in page order
    pub raw_images: Vec<RawImage>,
}

impl PageExtraction {
    pub fn new(page_index: u32, raw_text: impl Into<String>) -> Self {
        Self {
            page_index,
            raw_text: raw_text.into(),
            raw_images: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: RawImage) -> Self {
        self.raw_images.push(image);
        self
    }

    /// Whether the page has neither text nor images.
    pub fn is_blank(&self) -> bool {
        self.raw_text.trim().is_empty() && self.raw_images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_normalizes_corners() {
        let bbox = BBox::new(100.0, 500.0, 20.0, 300.0);
        assert_eq!(bbox.x0, 20.0);
        assert_eq!(bbox.y1, 500.0);
        assert_eq!(bbox.width(), 80.0);
        assert_eq!(bbox.center_y(), 400.0);
    }

    #[test]
    fn test_archive_name() {
        let image = RawImage::new(vec![1, 2, 3], 2);
        assert_eq!(image.archive_name(4), "page4_image2.png");
    }

    #[test]
    fn test_blank_page() {
        assert!(PageExtraction::new(1, "  \n ").is_blank());
        let page = PageExtraction::new(1, "").with_image(RawImage::new(vec![], 1));
        assert!(!page.is_blank());
    }
}
