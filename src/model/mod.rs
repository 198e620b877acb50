//! Data model shared by the decoder, the question pipeline and the writers.
//!
//! Decoder output ([`PageExtraction`], [`RawImage`]) flows in, structured
//! [`Question`]s and the [`ExtractionReport`] flow out.

mod notice;
mod page;
mod question;
mod report;

pub use notice::{Notice, NoticeKind, Partial};
pub use page::{BBox, PageExtraction, RawImage};
pub use question::{ChoiceOption, Label, Question, MAX_OPTIONS};
pub use report::{ExtractionReport, ExtractionSummary, PageRecord, PdfInfo};
