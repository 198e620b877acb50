//! # unquiz
//!
//! Multiple-choice question extraction from exam PDFs.
//!
//! Pages are decoded into text and images, the text is split into numbered
//! questions with options and declared answers, and each embedded image is
//! attached to the question (or option) it illustrates.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unquiz::extract_file;
//!
//! fn main() -> unquiz::Result<()> {
//!     let mut extraction = extract_file("paper.pdf")?;
//!     for question in &extraction.questions {
//!         println!("{}. {}", question.number, question.text);
//!     }
//!
//!     // images/, structured_questions.json, complete_extraction.json
//!     extraction.save("extracted_content")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Output
//!
//! - `structured_questions.json`: questions sorted by number
//! - `complete_extraction.json`: per-page records plus the question list
//! - `images/`: every embedded image as `page{N}_image{M}.png`, plus
//!   role-assigned copies `page{N}_question{Q}.png` and `page{N}_option{K}.png`

pub mod decode;
pub mod detect;
pub mod error;
pub mod model;
pub mod output;
pub mod stats;
pub mod structure;

// Re-export commonly used types
pub use decode::{DecodeOptions, ErrorMode, MemorySource, PageSource, PdfDecoder};
pub use detect::{is_pdf, PdfHeader};
pub use error::{Error, Result};
pub use model::{
    ChoiceOption, ExtractionReport, ExtractionSummary, Label, Notice, NoticeKind,
    PageExtraction, PageRecord, Question, RawImage,
};
pub use output::{DirectorySink, JsonFormat, MemorySink, OutputOptions, OutputSink};
pub use stats::{QuestionStats, Section, SectionRanges};
pub use structure::{Extraction, NumberingPolicy, QuestionPipeline, StructureOptions};

use std::path::Path;

/// Extract questions from a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use unquiz::extract_file;
///
/// let extraction = extract_file("paper.pdf").unwrap();
/// println!("{} questions", extraction.questions.len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Extraction> {
    Unquiz::new().extract(path)
}

/// Extract questions from a PDF file and write all output under `dir`.
///
/// # Example
///
/// ```no_run
/// use unquiz::extract_to_dir;
///
/// let extraction = extract_to_dir("paper.pdf", "extracted_content").unwrap();
/// println!("{} images", extraction.summary().total_images_extracted);
/// ```
pub fn extract_to_dir<P: AsRef<Path>, Q: AsRef<Path>>(path: P, dir: Q) -> Result<Extraction> {
    Unquiz::new().extract_to(path, dir)
}

/// Builder for decoding, structuring and writing in one go.
///
/// # Example
///
/// ```no_run
/// use unquiz::Unquiz;
///
/// let extraction = Unquiz::new()
///     .any_numbering()
///     .compact()
///     .extract_to("paper.pdf", "out")?;
/// # Ok::<(), unquiz::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unquiz {
    decode_options: DecodeOptions,
    structure_options: StructureOptions,
    output_options: OutputOptions,
}

impl Unquiz {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first page that cannot be decoded.
    pub fn strict(mut self) -> Self {
        self.decode_options = self.decode_options.strict();
        self
    }

    /// Replace unreadable pages with empty ones instead of failing.
    pub fn lenient(mut self) -> Self {
        self.decode_options = self.decode_options.lenient();
        self
    }

    /// Skip image extraction.
    pub fn text_only(mut self) -> Self {
        self.decode_options = self.decode_options.text_only();
        self
    }

    /// Set the question numbering policy.
    pub fn with_numbering(mut self, policy: NumberingPolicy) -> Self {
        self.structure_options = self.structure_options.with_numbering(policy);
        self
    }

    /// Accept every numbering marker.
    pub fn any_numbering(mut self) -> Self {
        self.structure_options = self.structure_options.any_numbering();
        self
    }

    /// Enable or disable closing a question at its answer line.
    pub fn with_close_on_answer(mut self, close: bool) -> Self {
        self.structure_options = self.structure_options.with_close_on_answer(close);
        self
    }

    /// Replace the structuring options.
    pub fn with_structure_options(mut self, options: StructureOptions) -> Self {
        self.structure_options = options;
        self
    }

    /// Set the JSON output format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.output_options = self.output_options.with_format(format);
        self
    }

    /// Write compact JSON.
    pub fn compact(mut self) -> Self {
        self.output_options = self.output_options.compact();
        self
    }

    pub fn decode_options(&self) -> &DecodeOptions {
        &self.decode_options
    }

    pub fn structure_options(&self) -> &StructureOptions {
        &self.structure_options
    }

    pub fn output_options(&self) -> &OutputOptions {
        &self.output_options
    }

    /// Decode and structure a PDF file.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<Extraction> {
        self.extract_with_progress(path, |_| {})
    }

    /// Like [`extract`](Self::extract), calling `on_page` after each page.
    pub fn extract_with_progress<P, F>(&self, path: P, on_page: F) -> Result<Extraction>
    where
        P: AsRef<Path>,
        F: FnMut(&PageRecord),
    {
        let path = path.as_ref();
        let decoder = PdfDecoder::open_with_options(path, self.decode_options.clone())?;
        self.extract_source(&file_name(path), &decoder, on_page)
    }

    /// Structure pages from any [`PageSource`], decoding one page at a time.
    ///
    /// A page that fails to decode aborts the run unless the builder is
    /// [`lenient`](Self::lenient).
    pub fn extract_source<F>(
        &self,
        filename: &str,
        source: &dyn PageSource,
        on_page: F,
    ) -> Result<Extraction>
    where
        F: FnMut(&PageRecord),
    {
        let total_pages = source.page_count();
        let pages = (1..=total_pages as u32).map(|number| {
            self.decode_options
                .recover(number, source.decode_page(number))
        });
        let pipeline = QuestionPipeline::new(self.structure_options.clone());
        pipeline.try_run_with_progress(filename, total_pages, pages, on_page)
    }

    /// Extract and write everything under `dir`.
    pub fn extract_to<P: AsRef<Path>, Q: AsRef<Path>>(&self, path: P, dir: Q) -> Result<Extraction> {
        let mut extraction = self.extract(path)?;
        self.write(&mut extraction, dir)?;
        Ok(extraction)
    }

    /// Write an extraction under `dir` with this builder's output options.
    pub fn write<P: AsRef<Path>>(&self, extraction: &mut Extraction, dir: P) -> Result<()> {
        let mut sink = DirectorySink::create(dir)?;
        extraction.write_to(&mut sink, &self.output_options)
    }
}

/// Base name of `path` for the report.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
