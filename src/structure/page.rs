//! Per-page aggregation of chunks, fields and images.

use super::fields::FieldExtractor;
use super::images::{ImageAssociator, ImageOutput, PlacedQuestion};
use super::normalize::LineNormalizer;
use super::options::StructureOptions;
use super::segment::TextSegmenter;
use crate::model::{Notice, NoticeKind, PageExtraction, PageRecord, Partial, Question};

/// State carried from one page to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Last question of the previous page, still open for continuation
    pub open: Option<Question>,

    /// Last question number accepted so far in the document
    pub last_number: Option<u32>,
}

/// Everything produced by one page.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub record: PageRecord,

    /// A question from an earlier page that finished on this one
    pub closed: Option<Question>,

    /// Image files to persist
    pub images: Vec<ImageOutput>,

    pub notices: Vec<Notice>,
}

/// Turns one page into a [`PageRecord`], threading a [`Cursor`] across pages.
pub struct PageAggregator {
    options: StructureOptions,
    segmenter: TextSegmenter,
    extractor: FieldExtractor,
    normalizer: LineNormalizer,
    associator: ImageAssociator,
}

impl PageAggregator {
    pub fn new(options: StructureOptions) -> Self {
        Self {
            segmenter: TextSegmenter::new(options.numbering),
            extractor: FieldExtractor::new(),
            normalizer: LineNormalizer::new(),
            associator: ImageAssociator::new(),
            options,
        }
    }

    pub fn options(&self) -> &StructureOptions {
        &self.options
    }

    /// Process one page. Never fails; anything odd becomes a notice.
    pub fn process(&self, page: PageExtraction, cursor: Cursor) -> (PageOutcome, Cursor) {
        let PageExtraction {
            page_index,
            raw_text,
            raw_images,
        } = page;
        let mut notices = Vec::new();
        let mut carried = cursor.open;

        let body = if self.options.strip_page_numbers {
            self.normalizer.content_range(&raw_text)
        } else {
            0..raw_text.len()
        };

        let mut placed = Vec::new();
        // Chunks borrow the page text, which moves into the record below.
        let last_number = {
            let mut segments =
                self.segmenter
                    .segment(page_index, &raw_text, body, cursor.last_number);
            for chunk in segments.by_ref() {
                match self.extractor.extract(&chunk) {
                    Some(partial) => placed.push(PlacedQuestion {
                        span: chunk.span.clone(),
                        question: partial.drain_into(&mut notices),
                    }),
                    None => match carried.as_mut() {
                        Some(open) => notices.extend(self.extractor.absorb(open, chunk.body())),
                        None => notices.push(
                            Notice::new(NoticeKind::OrphanText {
                                text: chunk.body().trim().to_string(),
                            })
                            .on_page(page_index),
                        ),
                    },
                }
            }
            segments.last_number()
        };

        let raw_image_count = raw_images.len();
        let association = self
            .associator
            .associate(
                page_index,
                raw_images,
                raw_text.len(),
                carried.as_mut(),
                &mut placed,
            )
            .drain_into(&mut notices);

        log::debug!(
            "page {}: {} questions, {} images, {} unassociated",
            page_index,
            placed.len(),
            raw_image_count,
            association.unassociated.len()
        );

        let mut record = PageRecord::new(page_index, raw_text);
        record.images = association.archive;
        record.raw_image_count = raw_image_count;
        record.unassociated_images = association.unassociated;

        // A carried question ends where the first new one begins.
        let mut closed = None;
        if !placed.is_empty() || self.closes(carried.as_ref()) {
            closed = carried.take();
        }
        if let Some(question) = &closed {
            notices.extend(self.extractor.audit(question));
        }

        let mut open = carried;
        let last_index = placed.len().checked_sub(1);
        for (i, PlacedQuestion { question, .. }) in placed.into_iter().enumerate() {
            if Some(i) == last_index && !self.closes(Some(&question)) {
                open = Some(question);
            } else {
                notices.extend(self.extractor.audit(&question));
                record.push_question(question);
            }
        }

        let outcome = PageOutcome {
            record,
            closed,
            images: association.outputs,
            notices,
        };
        (outcome, Cursor { open, last_number })
    }

    /// Close out the document, auditing the question still open.
    pub fn finish(&self, cursor: Cursor) -> Partial<Option<Question>> {
        match cursor.open {
            Some(question) => {
                let notices = self.extractor.audit(&question);
                Partial::with_notices(Some(question), notices)
            }
            None => Partial::clean(None),
        }
    }

    fn closes(&self, question: Option<&Question>) -> bool {
        self.options.close_on_answer && question.map_or(false, |q| q.answer.is_some())
    }
}

impl Default for PageAggregator {
    fn default() -> Self {
        Self::new(StructureOptions::default())
    }
}
