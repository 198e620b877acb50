//! Question structuring.
//!
//! Turns decoded pages into numbered multiple-choice questions:
//!
//! 1. [`TextSegmenter`] splits each page's text on numbering markers.
//! 2. [`FieldExtractor`] pulls body, options and answer out of each chunk.
//! 3. [`ImageAssociator`] assigns the page's images to questions.
//! 4. [`PageAggregator`] combines the above and threads a [`Cursor`] so a
//!    question can continue onto the next page.
//! 5. [`DocumentAssembler`] folds page outcomes into the final list and report.
//!
//! [`QuestionPipeline`] drives all of it over a sequence of pages.

mod assemble;
mod fields;
mod images;
mod normalize;
mod options;
mod page;
mod segment;

pub use assemble::{DocumentAssembler, Extraction};
pub use fields::FieldExtractor;
pub use images::{Association, ImageAssociator, ImageOutput, PlacedQuestion};
pub use normalize::LineNormalizer;
pub use options::{NumberingPolicy, StructureOptions, DEFAULT_MAX_GAP};
pub use page::{Cursor, PageAggregator, PageOutcome};
pub use segment::{QuestionChunk, Segments, TextSegmenter};

use crate::error::Result;
use crate::model::{PageExtraction, PageRecord};

/// Runs the structuring stages over a document's pages, in order.
pub struct QuestionPipeline {
    aggregator: PageAggregator,
}

impl QuestionPipeline {
    pub fn new(options: StructureOptions) -> Self {
        Self {
            aggregator: PageAggregator::new(options),
        }
    }

    /// Structure `pages` from a document named `filename`.
    pub fn run<I>(&self, filename: &str, total_pages: usize, pages: I) -> Extraction
    where
        I: IntoIterator<Item = PageExtraction>,
    {
        self.run_with_progress(filename, total_pages, pages, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_page` after each page.
    pub fn run_with_progress<I, F>(
        &self,
        filename: &str,
        total_pages: usize,
        pages: I,
        mut on_page: F,
    ) -> Extraction
    where
        I: IntoIterator<Item = PageExtraction>,
        F: FnMut(&PageRecord),
    {
        let mut run = Run::new(&self.aggregator, filename, total_pages);
        for page in pages {
            run.step(page, &mut on_page);
        }
        run.finish()
    }

    /// Structure pages that are decoded as they are pulled.
    ///
    /// Stops at the first page that failed to decode; nothing is returned for
    /// the pages before it.
    pub fn try_run_with_progress<I, F>(
        &self,
        filename: &str,
        total_pages: usize,
        pages: I,
        mut on_page: F,
    ) -> Result<Extraction>
    where
        I: IntoIterator<Item = Result<PageExtraction>>,
        F: FnMut(&PageRecord),
    {
        let mut run = Run::new(&self.aggregator, filename, total_pages);
        for page in pages {
            run.step(page?, &mut on_page);
        }
        Ok(run.finish())
    }
}

/// One document's fold state.
struct Run<'a> {
    aggregator: &'a PageAggregator,
    assembler: DocumentAssembler,
    cursor: Cursor,
}

impl<'a> Run<'a> {
    fn new(aggregator: &'a PageAggregator, filename: &str, total_pages: usize) -> Self {
        Self {
            aggregator,
            assembler: DocumentAssembler::new(filename, total_pages),
            cursor: Cursor::default(),
        }
    }

    fn step<F: FnMut(&PageRecord)>(&mut self, page: PageExtraction, on_page: &mut F) {
        let cursor = std::mem::take(&mut self.cursor);
        let (outcome, next) = self.aggregator.process(page, cursor);
        on_page(&outcome.record);
        self.assembler.add_page(outcome);
        self.cursor = next;
    }

    fn finish(self) -> Extraction {
        let last = self.aggregator.finish(self.cursor);
        let extraction = self.assembler.finish(last.value, last.notices);
        log::debug!(
            "{}: {} questions, {} notices",
            extraction.report.pdf_info.filename,
            extraction.questions.len(),
            extraction.notices.len()
        );
        extraction
    }
}

impl Default for QuestionPipeline {
    fn default() -> Self {
        Self::new(StructureOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Label, RawImage};

    #[test]
    fn test_pipeline_two_pages() {
        let pages = vec![
            PageExtraction::new(1, "1. Add 1+1\n[A] 2\n[B] 3\nAnswer: A\n2. Which number\nis even?"),
            PageExtraction::new(2, "[A] 3\n[B] 4\nAnswer: B\n3. Last?\n[A] yes"),
        ];
        let mut seen = Vec::new();
        let extraction = QuestionPipeline::default().run_with_progress("t.pdf", 2, pages, |r| {
            seen.push(r.page_number)
        });

        assert_eq!(seen, vec![1, 2]);
        let numbers: Vec<_> = extraction.questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(extraction.questions[1].text, "Which number is even?");
        assert_eq!(extraction.questions[1].answer, Some(Label::B));
        assert_eq!(extraction.questions[1].page, 1);
        assert_eq!(extraction.report.pages[0].questions_found, 2);
        assert_eq!(extraction.report.pages[1].questions_found, 1);
    }

    #[test]
    fn test_try_run_stops_at_failed_page() {
        let pages = vec![
            Ok(PageExtraction::new(1, "1. Fine?\n[A] yes\nAnswer: A")),
            Err(crate::Error::PdfParse("bad page".into())),
            Ok(PageExtraction::new(3, "2. Never reached")),
        ];
        let mut seen = Vec::new();
        let result = QuestionPipeline::default().try_run_with_progress("t.pdf", 3, pages, |r| {
            seen.push(r.page_number)
        });

        assert!(matches!(result, Err(crate::Error::PdfParse(_))));
        assert_eq!(seen, vec![1]);
    }

    #[test]
    fn test_image_between_questions() {
        let text = "5. Look at the figure.\n[A] x\n[B] y\nAnswer: A\n6. Next one\n[A] z";
        let anchor = text.find("6.").unwrap();
        let page = PageExtraction::new(2, text)
            .with_image(RawImage::new(vec![0x89], 1).with_anchor(anchor));
        let extraction = QuestionPipeline::new(StructureOptions::new().any_numbering())
            .run("t.pdf", 1, vec![page]);

        assert_eq!(
            extraction.questions[0].question_image.as_deref(),
            Some("page2_question5.png")
        );
        assert!(extraction.questions[1].question_image.is_none());
    }
}
