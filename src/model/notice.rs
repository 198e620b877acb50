//! Non-fatal extraction notices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Something the pipeline noticed but recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Page the notice refers to
    pub page: Option<u32>,

    /// Question the notice refers to
    pub question: Option<u32>,

    pub kind: NoticeKind,
}

/// Kind of non-fatal notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoticeKind {
    /// No option lines were found for a question
    MissingOptions,
    /// No answer cue was found for a question
    MissingAnswer,
    /// A numbered question has no body text
    EmptyQuestionText,
    /// More than four options; the extra one was dropped
    ExtraOption { text: String },
    /// Unnumbered text with no open question to continue
    OrphanText { text: String },
    /// An image had no question to attach to
    UnassociatedImage { filename: String },
    /// A question already carries four option images
    OptionImageOverflow { filename: String },
    /// The same question number appeared twice; the later one was kept
    DuplicateQuestion { dropped_page: u32 },
    /// An image file could not be written
    ImageWriteFailed { filename: String, reason: String },
}

impl Notice {
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            page: None,
            question: None,
            kind,
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn for_question(mut self, number: u32) -> Self {
        self.question = Some(number);
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(page) = self.page {
            write!(f, "page {}: ", page)?;
        }
        if let Some(question) = self.question {
            write!(f, "question {}: ", question)?;
        }
        match &self.kind {
            NoticeKind::MissingOptions => write!(f, "no options found"),
            NoticeKind::MissingAnswer => write!(f, "no answer found"),
            NoticeKind::EmptyQuestionText => write!(f, "empty question text"),
            NoticeKind::ExtraOption { text } => write!(f, "dropped fifth option {:?}", text),
            NoticeKind::OrphanText { text } => write!(f, "unattached text {:?}", text),
            NoticeKind::UnassociatedImage { filename } => {
                write!(f, "image {} has no question", filename)
            }
            NoticeKind::OptionImageOverflow { filename } => {
                write!(f, "image {} exceeds four option images", filename)
            }
            NoticeKind::DuplicateQuestion { dropped_page } => {
                write!(f, "duplicate number, dropped copy from page {}", dropped_page)
            }
            NoticeKind::ImageWriteFailed { filename, reason } => {
                write!(f, "failed to write {}: {}", filename, reason)
            }
        }
    }
}

/// A best-effort value together with what was missed while producing it.
#[derive(Debug, Clone)]
pub struct Partial<T> {
    pub value: T,
    pub notices: Vec<Notice>,
}

impl<T> Partial<T> {
    /// A value with no notices.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            notices: Vec::new(),
        }
    }

    pub fn with_notices(value: T, notices: Vec<Notice>) -> Self {
        Self { value, notices }
    }

    /// Whether nothing was missed.
    pub fn is_clean(&self) -> bool {
        self.notices.is_empty()
    }

    /// Split into value and notices, appending the notices to `sink`.
    pub fn drain_into(self, sink: &mut Vec<Notice>) -> T {
        sink.extend(self.notices);
        self.value
    }
}
