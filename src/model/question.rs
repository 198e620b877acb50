//! Question-level types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of options (and option images) a question can carry.
pub const MAX_OPTIONS: usize = 4;

/// A multiple-choice label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    A,
    B,
    C,
    D,
}

impl Label {
    /// All labels in positional order.
    pub const ALL: [Label; MAX_OPTIONS] = [Label::A, Label::B, Label::C, Label::D];

    /// Label for a zero-based option position.
    pub fn from_position(position: usize) -> Option<Self> {
        Self::ALL.get(position).copied()
    }

    /// Parse a label letter, case-insensitive.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Label::A),
            'B' => Some(Label::B),
            'C' => Some(Label::C),
            'D' => Some(Label::D),
            _ => None,
        }
    }

    /// Zero-based position of this label.
    pub fn position(self) -> usize {
        self as usize
    }

    /// The label letter.
    pub fn as_char(self) -> char {
        (b'A' + self as u8) as char
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One answer choice. Serialized as a single string such as `"[B] 4"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChoiceOption {
    pub label: Label,
    pub text: String,
}

impl ChoiceOption {
    pub fn new(label: Label, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }

    /// Append a continuation line to the option text.
    pub fn extend_text(&mut self, line: &str) {
        append_words(&mut self.text, line);
    }
}

impl fmt::Display for ChoiceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "[{}]", self.label)
        } else {
            write!(f, "[{}] {}", self.label, self.text)
        }
    }
}

impl From<ChoiceOption> for String {
    fn from(option: ChoiceOption) -> Self {
        option.to_string()
    }
}

impl TryFrom<String> for ChoiceOption {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        let (open, letter, close) = (chars.next(), chars.next(), chars.next());
        match (open, letter.and_then(Label::from_char), close) {
            (Some('['), Some(label), Some(']')) => Ok(Self::new(label, chars.as_str().trim())),
            _ => Err(format!("not a labelled option: {:?}", value)),
        }
    }
}

/// A structured multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question number as printed in the document
    #[serde(rename = "question_number")]
    pub number: u32,

    /// Question body (may be empty if parsing missed it)
    #[serde(rename = "question")]
    pub text: String,

    /// Answer choices, at most four
    pub options: Vec<ChoiceOption>,

    /// Declared answer, if the document states one
    pub answer: Option<Label>,

    /// Page the question starts on (1-indexed)
    pub page: u32,

    /// Role-assigned question illustration
    #[serde(rename = "images")]
    pub question_image: Option<String>,

    /// Role-assigned option illustrations, at most four
    pub option_images: Vec<String>,
}

impl Question {
    /// Create an empty question.
    pub fn new(number: u32, page: u32) -> Self {
        Self {
            number,
            text: String::new(),
            options: Vec::new(),
            answer: None,
            page,
            question_image: None,
            option_images: Vec::new(),
        }
    }

    /// Append a line of body text, separated by a single space.
    pub fn extend_text(&mut self, line: &str) {
        append_words(&mut self.text, line);
    }

    /// Whether another option can still be accepted.
    pub fn has_option_room(&self) -> bool {
        self.options.len() < MAX_OPTIONS
    }

    /// Whether another option image can still be accepted.
    pub fn has_option_image_room(&self) -> bool {
        self.option_images.len() < MAX_OPTIONS
    }

    /// Whether any image was assigned to this question.
    pub fn has_images(&self) -> bool {
        self.question_image.is_some() || !self.option_images.is_empty()
    }

    /// All image filenames referenced by this question.
    pub fn image_refs(&self) -> impl Iterator<Item = &str> {
        self.question_image
            .iter()
            .chain(self.option_images.iter())
            .map(String::as_str)
    }

    /// Drop references to `filename`.
    pub fn forget_image(&mut self, filename: &str) {
        if self.question_image.as_deref() == Some(filename) {
            self.question_image = None;
        }
        self.option_images.retain(|f| f != filename);
    }
}

fn append_words(target: &mut String, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(line);
}
