//! Section breakdown and answer statistics over extracted questions.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::model::Question;

/// Paper section a question belongs to, by its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    LogicalReasoning,
    Mathematics,
    AchieverSection,
}

impl Section {
    pub const ALL: [Section; 3] = [
        Section::LogicalReasoning,
        Section::Mathematics,
        Section::AchieverSection,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::LogicalReasoning => "Logical Reasoning",
            Section::Mathematics => "Mathematics",
            Section::AchieverSection => "Achiever Section",
        };
        f.write_str(name)
    }
}

/// Question-number ranges for each section. Numbers past the mathematics
/// range fall in the achiever section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRanges {
    pub logical_reasoning: RangeInclusive<u32>,
    pub mathematics: RangeInclusive<u32>,
}

impl SectionRanges {
    pub fn new(logical_reasoning: RangeInclusive<u32>, mathematics: RangeInclusive<u32>) -> Self {
        Self {
            logical_reasoning,
            mathematics,
        }
    }

    /// Section for question `number`, if any.
    pub fn section_of(&self, number: u32) -> Option<Section> {
        if self.logical_reasoning.contains(&number) {
            Some(Section::LogicalReasoning)
        } else if self.mathematics.contains(&number) {
            Some(Section::Mathematics)
        } else if number > *self.mathematics.end() {
            Some(Section::AchieverSection)
        } else {
            None
        }
    }
}

impl Default for SectionRanges {
    fn default() -> Self {
        Self::new(1..=5, 6..=30)
    }
}

/// Aggregate statistics for a question list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub total_questions: usize,

    pub by_section: BTreeMap<Section, usize>,

    /// Count per answer letter; unanswered questions are keyed `""`
    pub answer_distribution: BTreeMap<String, usize>,

    pub questions_with_images: usize,
}

impl QuestionStats {
    /// Compute statistics with the default section ranges.
    pub fn compute(questions: &[Question]) -> Self {
        Self::compute_with(questions, &SectionRanges::default())
    }

    pub fn compute_with(questions: &[Question], ranges: &SectionRanges) -> Self {
        let mut by_section: BTreeMap<Section, usize> =
            Section::ALL.iter().map(|&s| (s, 0)).collect();
        let mut answer_distribution = BTreeMap::new();

        for question in questions {
            if let Some(section) = ranges.section_of(question.number) {
                *by_section.entry(section).or_default() += 1;
            }
            let key = question
                .answer
                .map(|label| label.to_string())
                .unwrap_or_default();
            *answer_distribution.entry(key).or_default() += 1;
        }

        Self {
            total_questions: questions.len(),
            by_section,
            answer_distribution,
            questions_with_images: questions.iter().filter(|q| q.has_images()).count(),
        }
    }

    pub fn section_count(&self, section: Section) -> usize {
        self.by_section.get(&section).copied().unwrap_or(0)
    }
}

/// Group questions by section, keeping their order.
pub fn categorize<'a>(
    questions: &'a [Question],
    ranges: &SectionRanges,
) -> BTreeMap<Section, Vec<&'a Question>> {
    let mut groups: BTreeMap<Section, Vec<&Question>> = BTreeMap::new();
    for question in questions {
        if let Some(section) = ranges.section_of(question.number) {
            groups.entry(section).or_default().push(question);
        }
    }
    groups
}
