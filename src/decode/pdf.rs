//! lopdf-backed page decoding.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::content::LayoutWalker;
use super::xobject::{is_image, to_png};
use super::{decode_text_simple, DecodeOptions, PageSource};
use crate::detect::{sniff_bytes, sniff_path, PdfHeader};
use crate::error::{Error, Result};
use crate::model::{PageExtraction, RawImage};

/// Depth limit when walking up the page tree for inherited resources.
const MAX_TREE_DEPTH: usize = 32;

/// Decodes a PDF document page by page.
pub struct PdfDecoder {
    doc: Document,
    header: PdfHeader,
    options: DecodeOptions,
}

impl PdfDecoder {
    /// Open a PDF file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, DecodeOptions::default())
    }

    /// Open a PDF file.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: DecodeOptions) -> Result<Self> {
        let path = path.as_ref();
        let header = sniff_path(path)?;
        let doc = Document::load(path)?;
        log::debug!("Opened {} ({})", path.display(), header);
        Self::with_document(doc, header, options)
    }

    /// Load a PDF held in memory.
    pub fn from_bytes(data: &[u8], options: DecodeOptions) -> Result<Self> {
        let header = sniff_bytes(data)?;
        let doc = Document::load_mem(data)?;
        Self::with_document(doc, header, options)
    }

    fn with_document(doc: Document, header: PdfHeader, options: DecodeOptions) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self {
            doc,
            header,
            options,
        })
    }

    /// Header information of the document.
    pub fn header(&self) -> &PdfHeader {
        &self.header
    }

    fn decode_page_id(&self, page_number: u32, page_id: ObjectId) -> Result<PageExtraction> {
        let data = self.doc.get_page_content(page_id)?;
        let content = Content::decode(&data)?;

        let encodings: BTreeMap<_, _> = self
            .doc
            .get_page_fonts(page_id)
            .map(|fonts| {
                fonts
                    .into_iter()
                    .filter_map(|(name, font)| {
                        font.get_font_encoding(&self.doc).ok().map(|enc| (name, enc))
                    })
                    .collect()
            })
            .unwrap_or_default();
        let decode = |font: &[u8], bytes: &[u8]| {
            encodings
                .get(font)
                .and_then(|enc| Document::decode_text(enc, bytes).ok())
                .unwrap_or_else(|| decode_text_simple(bytes))
        };
        let layout = LayoutWalker::new(&decode).walk(&content.operations);

        let mut page = PageExtraction::new(page_number, layout.text.clone());
        if !self.options.extract_images {
            return Ok(page);
        }

        let xobjects = self.page_xobjects(page_id);
        let mut seen = HashSet::new();
        let mut source_index = 0u32;

        // Drawn images first, in drawing order, then any that were never drawn.
        let drawn = layout
            .placements
            .iter()
            .map(|p| (p.name.as_slice(), Some(p.bbox)));
        let undrawn = xobjects.iter().map(|(name, _)| (name.as_slice(), None));

        for (name, bbox) in drawn.chain(undrawn) {
            if !seen.insert(name.to_vec()) {
                continue;
            }
            let Some(stream) = xobjects.get(name).and_then(|id| self.image_stream(*id)) else {
                continue;
            };

            // Skipped images keep their number so later ones are not renumbered.
            source_index += 1;
            let bytes = match to_png(stream) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!(
                        "Skipping image {} on page {}: {}",
                        String::from_utf8_lossy(name),
                        page_number,
                        e
                    );
                    continue;
                }
            };

            let mut image = RawImage::new(bytes, source_index);
            if let Some(bbox) = bbox {
                image = image.with_bbox(bbox).with_anchor(layout.anchor_for(&bbox));
            }
            page = page.with_image(image);
        }

        log::debug!(
            "Decoded page {}: {} bytes of text, {} images",
            page_number,
            page.raw_text.len(),
            page.raw_images.len()
        );
        Ok(page)
    }

    /// The stream behind `id` if it is an image XObject.
    fn image_stream(&self, id: ObjectId) -> Option<&Stream> {
        match self.doc.get_object(id) {
            Ok(Object::Stream(stream)) if is_image(&stream.dict) => Some(stream),
            _ => None,
        }
    }

    /// XObject resource names mapped to their object ids.
    fn page_xobjects(&self, page_id: ObjectId) -> BTreeMap<Vec<u8>, ObjectId> {
        let mut xobjects = BTreeMap::new();
        let Some(resources) = self.page_resources(page_id) else {
            return xobjects;
        };
        let Some(dict) = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| self.resolve_dict(obj))
        else {
            return xobjects;
        };
        for (name, obj) in dict.iter() {
            if let Ok(id) = obj.as_reference() {
                xobjects.insert(name.clone(), id);
            }
        }
        xobjects
    }

    /// The page's resource dictionary, inherited from the page tree if needed.
    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node = self.doc.get_dictionary(page_id).ok();
        for _ in 0..MAX_TREE_DEPTH {
            let dict = node?;
            if let Some(resources) = dict
                .get(b"Resources")
                .ok()
                .and_then(|obj| self.resolve_dict(obj))
            {
                return Some(resources);
            }
            node = dict
                .get(b"Parent")
                .and_then(Object::as_reference)
                .and_then(|id| self.doc.get_dictionary(id))
                .ok();
        }
        None
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

impl PageSource for PdfDecoder {
    fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn decode_page(&self, page_number: u32) -> Result<PageExtraction> {
        let pages = self.doc.get_pages();
        let page_id = *pages.get(&page_number).ok_or_else(|| {
            Error::Other(format!(
                "page {} out of range (document has {})",
                page_number,
                pages.len()
            ))
        })?;
        self.decode_page_id(page_number, page_id)
    }

    /// Decode every page, applying the configured [`ErrorMode`](super::ErrorMode).
    fn pages(&self) -> Result<Vec<PageExtraction>> {
        self.doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| {
                self.options
                    .recover(number, self.decode_page_id(number, id))
            })
            .collect()
    }
}
