//! Page records and the complete extraction report.

use super::Question;
use serde::{Deserialize, Serialize};

/// Structured result for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Raw page text as decoded
    pub text: String,

    /// Archive filenames of every image on the page
    pub images: Vec<String>,

    /// Number of questions that start on this page
    pub questions_found: usize,

    /// Number of images present on the page
    pub raw_image_count: usize,

    /// Questions that start on this page
    pub questions: Vec<Question>,

    /// Images that could not be attached to any question
    pub unassociated_images: Vec<String>,
}

impl PageRecord {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
            images: Vec::new(),
            questions_found: 0,
            raw_image_count: 0,
            questions: Vec::new(),
            unassociated_images: Vec::new(),
        }
    }

    /// File a finished question under this page.
    pub fn push_question(&mut self, question: Question) {
        self.questions.push(question);
        self.questions_found = self.questions.len();
    }
}

/// Totals over the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub total_images_extracted: usize,
    pub total_questions_found: usize,
    pub pages_processed: usize,
}

/// Document-level information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfInfo {
    /// Base name of the input file
    pub filename: String,

    pub total_pages: usize,

    pub extraction_summary: ExtractionSummary,
}

/// The complete extraction report written to `complete_extraction.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub pdf_info: PdfInfo,

    pub pages: Vec<PageRecord>,

    /// Same content as `structured_questions.json`
    pub questions: Vec<Question>,
}

impl ExtractionReport {
    pub fn summary(&self) -> &ExtractionSummary {
        &self.pdf_info.extraction_summary
    }

    /// Drop every reference to `filename` from questions and page records.
    pub fn forget_image(&mut self, filename: &str) {
        for question in &mut self.questions {
            question.forget_image(filename);
        }
        for page in &mut self.pages {
            page.images.retain(|f| f != filename);
            page.unassociated_images.retain(|f| f != filename);
            for question in &mut page.questions {
                question.forget_image(filename);
            }
        }
    }
}
