//! Folding page outcomes into the final question list and report.

use super::images::ImageOutput;
use super::page::PageOutcome;
use crate::model::{
    ExtractionReport, ExtractionSummary, Notice, NoticeKind, PageRecord, PdfInfo, Question,
};

/// The finished result of a document run.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Questions sorted by number, one per number
    pub questions: Vec<Question>,

    pub report: ExtractionReport,

    /// Image files to persist, archive and role-assigned copies alike
    pub images: Vec<ImageOutput>,

    /// Everything recovered from along the way
    pub notices: Vec<Notice>,
}

impl Extraction {
    pub fn summary(&self) -> &ExtractionSummary {
        self.report.summary()
    }

    /// Drop every reference to an image that could not be persisted.
    pub fn forget_image(&mut self, filename: &str) {
        for question in &mut self.questions {
            question.forget_image(filename);
        }
        self.report.forget_image(filename);
    }
}

/// Accumulates page outcomes in document order.
#[derive(Debug)]
pub struct DocumentAssembler {
    filename: String,
    total_pages: usize,
    records: Vec<PageRecord>,
    images: Vec<ImageOutput>,
    notices: Vec<Notice>,
}

impl DocumentAssembler {
    pub fn new(filename: impl Into<String>, total_pages: usize) -> Self {
        Self {
            filename: filename.into(),
            total_pages,
            records: Vec::with_capacity(total_pages),
            images: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn add_page(&mut self, outcome: PageOutcome) {
        self.records.push(outcome.record);
        if let Some(question) = outcome.closed {
            self.file(question);
        }
        self.images.extend(outcome.images);
        self.notices.extend(outcome.notices);
    }

    /// Notices gathered so far.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Finish the fold. `last` is the question still open after the final
    /// page, and `notices` any remaining notices about it.
    pub fn finish(mut self, last: Option<Question>, notices: Vec<Notice>) -> Extraction {
        if let Some(question) = last {
            self.file(question);
        }
        self.notices.extend(notices);

        let mut flat: Vec<Question> = self
            .records
            .iter()
            .flat_map(|record| record.questions.iter().cloned())
            .collect();
        flat.sort_by_key(|q| q.number);

        let mut questions: Vec<Question> = Vec::with_capacity(flat.len());
        for question in flat {
            match questions.last_mut() {
                Some(kept) if kept.number == question.number => {
                    log::debug!(
                        "question {} repeated on page {}, keeping the later copy",
                        question.number,
                        question.page
                    );
                    self.notices.push(
                        Notice::new(NoticeKind::DuplicateQuestion {
                            dropped_page: kept.page,
                        })
                        .on_page(question.page)
                        .for_question(question.number),
                    );
                    *kept = question;
                }
                _ => questions.push(question),
            }
        }

        let summary = ExtractionSummary {
            total_images_extracted: self.records.iter().map(|r| r.raw_image_count).sum(),
            total_questions_found: questions.len(),
            pages_processed: self.records.len(),
        };
        let report = ExtractionReport {
            pdf_info: PdfInfo {
                filename: self.filename,
                total_pages: self.total_pages,
                extraction_summary: summary,
            },
            pages: self.records,
            questions: questions.clone(),
        };

        Extraction {
            questions,
            report,
            images: self.images,
            notices: self.notices,
        }
    }

    fn file(&mut self, question: Question) {
        let slot = self
            .records
            .iter()
            .rposition(|record| record.page_number == question.page);
        match slot.or_else(|| self.records.len().checked_sub(1)) {
            Some(i) => self.records[i].push_question(question),
            None => log::warn!("no page record for question {}", question.number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(page: u32, numbers: &[u32], closed: Option<Question>) -> PageOutcome {
        let mut record = PageRecord::new(page, "");
        for &n in numbers {
            let mut q = Question::new(n, page);
            q.text = format!("q{} on p{}", n, page);
            record.push_question(q);
        }
        record.raw_image_count = 1;
        PageOutcome {
            record,
            closed,
            images: Vec::new(),
            notices: Vec::new(),
        }
    }

    #[test]
    fn test_sorted_and_summarized() {
        let mut assembler = DocumentAssembler::new("paper.pdf", 2);
        assembler.add_page(outcome(1, &[3, 1], None));
        assembler.add_page(outcome(2, &[2], None));
        let extraction = assembler.finish(None, Vec::new());

        let numbers: Vec<_> = extraction.questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(
            *extraction.summary(),
            ExtractionSummary {
                total_images_extracted: 2,
                total_questions_found: 3,
                pages_processed: 2,
            }
        );
        assert_eq!(extraction.report.questions, extraction.questions);
    }

    #[test]
    fn test_duplicates_keep_later_copy() {
        let mut assembler = DocumentAssembler::new("paper.pdf", 2);
        assembler.add_page(outcome(1, &[1, 2], None));
        assembler.add_page(outcome(2, &[2], None));
        let extraction = assembler.finish(None, Vec::new());

        assert_eq!(extraction.questions.len(), 2);
        assert_eq!(extraction.questions[1].text, "q2 on p2");
        assert!(extraction.notices.iter().any(|n| n.kind
            == NoticeKind::DuplicateQuestion { dropped_page: 1 }
            && n.question == Some(2)));
        assert_eq!(extraction.summary().total_questions_found, 2);
    }

    #[test]
    fn test_closed_question_filed_under_start_page() {
        let mut assembler = DocumentAssembler::new("paper.pdf", 2);
        assembler.add_page(outcome(1, &[1], None));
        assembler.add_page(outcome(2, &[], Some(Question::new(2, 1))));
        let extraction = assembler.finish(Some(Question::new(3, 2)), Vec::new());

        assert_eq!(extraction.report.pages[0].questions_found, 2);
        assert_eq!(extraction.report.pages[1].questions_found, 1);
        assert_eq!(extraction.questions.len(), 3);
    }

    #[test]
    fn test_forget_image_clears_references() {
        let mut assembler = DocumentAssembler::new("paper.pdf", 1);
        let mut q = Question::new(1, 1);
        q.question_image = Some("page1_question1.png".into());
        let mut page = outcome(1, &[], None);
        page.record.push_question(q);
        assembler.add_page(page);

        let mut extraction = assembler.finish(None, Vec::new());
        extraction.forget_image("page1_question1.png");
        assert!(extraction.questions[0].question_image.is_none());
        assert!(extraction.report.pages[0].questions[0].question_image.is_none());
        assert!(extraction.report.questions[0].question_image.is_none());
    }
}
