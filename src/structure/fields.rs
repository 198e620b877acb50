//! Question field extraction: body text, options and declared answer.

use regex::Regex;

use super::normalize::LineNormalizer;
use super::segment::QuestionChunk;
use crate::model::{ChoiceOption, Label, Notice, NoticeKind, Partial, Question};

/// A classified line of chunk text.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Body(String),
    Choice {
        captured: Option<Label>,
        text: String,
    },
    Answer(Label),
}

/// Extracts question fields from chunks and merges continuation text.
pub struct FieldExtractor {
    normalizer: LineNormalizer,
    option_start: Regex,
    inline_marker: Regex,
    answer: Regex,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            normalizer: LineNormalizer::new(),
            option_start: Regex::new(
                r"^(?:\[\s*([A-Da-d])\s*\]|\(\s*([A-Da-d1-4])\s*\)|([A-D])[.)](?:\s+|$))",
            )
            .expect("option pattern is valid"),
            inline_marker: Regex::new(r"\[\s*([A-Da-d])\s*\]|\(\s*([A-Da-d1-4])\s*\)")
                .expect("inline option pattern is valid"),
            answer: Regex::new(
                r"(?i)^(?:answer|ans)\b\s*[.:\-]?\s*(?:[\[(]\s*([a-d])\s*[\])].*|([a-d])\s*\.?)$",
            )
            .expect("answer pattern is valid"),
        }
    }

    /// Build a question from a numbered chunk.
    ///
    /// Never fails: a chunk without options or answer yields a question with
    /// empty fields. Returns `None` only for chunks without a number, which
    /// belong to the previous page's open question.
    pub fn extract(&self, chunk: &QuestionChunk<'_>) -> Option<Partial<Question>> {
        let number = chunk.starting_number?;
        let mut question = Question::new(number, chunk.page_index);
        let notices = self.absorb(&mut question, chunk.body());
        Some(Partial::with_notices(question, notices))
    }

    /// Merge `text` into an existing question.
    ///
    /// Body lines extend the question text until the question has options,
    /// then they extend the last option. Options are appended after the
    /// existing ones and an answer cue fills an unset answer.
    pub fn absorb(&self, question: &mut Question, text: &str) -> Vec<Notice> {
        let mut notices = Vec::new();
        let mut dropping = false;

        for line in text.lines().flat_map(|raw| self.classify(raw)) {
            match line {
                Line::Body(body) => {
                    if dropping {
                        continue;
                    }
                    match question.options.last_mut() {
                        Some(option) => option.extend_text(&body),
                        None => question.extend_text(&body),
                    }
                }
                Line::Choice { captured, text } => {
                    let position = question.options.len();
                    match resolve_label(position, captured) {
                        Some(label) if question.has_option_room() => {
                            dropping = false;
                            question.options.push(ChoiceOption::new(label, text));
                        }
                        _ => {
                            dropping = true;
                            notices.push(
                                Notice::new(NoticeKind::ExtraOption { text })
                                    .on_page(question.page)
                                    .for_question(question.number),
                            );
                        }
                    }
                }
                Line::Answer(label) => {
                    dropping = false;
                    question.answer.get_or_insert(label);
                }
            }
        }

        notices
    }

    /// Report fields a finished question is missing.
    pub fn audit(&self, question: &Question) -> Vec<Notice> {
        let mut kinds = Vec::new();
        if question.text.is_empty() {
            kinds.push(NoticeKind::EmptyQuestionText);
        }
        if question.options.is_empty() {
            kinds.push(NoticeKind::MissingOptions);
        }
        if question.answer.is_none() {
            kinds.push(NoticeKind::MissingAnswer);
        }
        kinds
            .into_iter()
            .map(|kind| {
                Notice::new(kind)
                    .on_page(question.page)
                    .for_question(question.number)
            })
            .collect()
    }

    /// Classify one raw line. An option line may expand into several options.
    fn classify(&self, raw: &str) -> Vec<Line> {
        let line = self.normalizer.normalize(raw);
        if line.is_empty() {
            return Vec::new();
        }

        if let Some(caps) = self.answer.captures(&line) {
            if let Some(label) = caps
                .get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| m.as_str().chars().next())
                .and_then(Label::from_char)
            {
                return vec![Line::Answer(label)];
            }
        }

        // (marker length, letter of a letter-dot marker)
        let marker = self.option_start.captures(&line).map(|caps| {
            let end = caps.get(0).map_or(0, |m| m.end());
            let letter = caps.get(3).and_then(|m| m.as_str().chars().next());
            (end, letter)
        });

        match marker {
            None => vec![Line::Body(line)],
            // Letter-dot markers ("A. text") are never split further.
            Some((end, Some(letter))) => vec![Line::Choice {
                captured: Label::from_char(letter),
                text: line[end..].trim().to_string(),
            }],
            Some((_, None)) => self.split_inline(&line),
        }
    }

    /// Split `[A] 3   [B] 4` into separate options.
    ///
    /// Only markers in the opening marker's style whose letters continue its
    /// sequence start a new option, so `(C) Both (1) and (2)` stays whole.
    /// Numeric openers are never split.
    fn split_inline(&self, line: &str) -> Vec<Line> {
        let bracketed = line.starts_with('[');
        let mut markers: Vec<(usize, usize, Option<Label>)> = Vec::new();
        let mut previous: Option<Label> = None;

        for caps in self.inline_marker.captures_iter(line) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let captured = caps
                .get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| m.as_str().chars().next())
                .and_then(Label::from_char);

            if whole.start() == 0 {
                markers.push((0, whole.end(), captured));
                previous = captured;
                continue;
            }

            let Some(last) = previous else {
                break;
            };
            let follows = captured.map(Label::position) == Some(last.position() + 1);
            let same_style = whole.as_str().starts_with('[') == bracketed;
            let at_boundary = line[..whole.start()].ends_with(char::is_whitespace);
            if follows && same_style && at_boundary {
                markers.push((whole.start(), whole.end(), captured));
                previous = captured;
            }
        }

        if markers.is_empty() {
            return vec![Line::Body(line.to_string())];
        }

        markers
            .iter()
            .enumerate()
            .map(|(i, &(_, end, captured))| {
                let next_start = markers.get(i + 1).map(|m| m.0).unwrap_or(line.len());
                Line::Choice {
                    captured,
                    text: line[end..next_start].trim().to_string(),
                }
            })
            .collect()
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the label for the option at `position`.
///
/// Labels follow position (A, B, C, D) unless the document states a
/// different letter, in which case the stated letter wins.
fn resolve_label(position: usize, captured: Option<Label>) -> Option<Label> {
    let positional = Label::from_position(position)?;
    match captured {
        Some(stated) if stated != positional => Some(stated),
        _ => Some(positional),
    }
}
