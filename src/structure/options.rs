//! Options for the question-structuring pipeline.

/// Default largest jump between consecutive accepted question numbers.
pub const DEFAULT_MAX_GAP: u32 = 10;

/// How the segmenter decides whether a line-leading number is a question marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingPolicy {
    /// Accept a number only if it is greater than the last accepted one and at
    /// most `max_gap` above it. The first number in a document is always
    /// accepted.
    Increasing { max_gap: u32 },
    /// Accept every well-formed marker.
    Any,
}

impl NumberingPolicy {
    /// Whether `number` is plausibly the next question after `last`.
    pub fn accepts(&self, number: u32, last: Option<u32>) -> bool {
        if number == 0 {
            return false;
        }
        match (self, last) {
            (NumberingPolicy::Any, _) => true,
            (NumberingPolicy::Increasing { .. }, None) => true,
            (NumberingPolicy::Increasing { max_gap }, Some(last)) => {
                number > last && number - last <= *max_gap
            }
        }
    }
}

impl Default for NumberingPolicy {
    fn default() -> Self {
        NumberingPolicy::Increasing {
            max_gap: DEFAULT_MAX_GAP,
        }
    }
}

/// Options for turning page text into questions.
#[derive(Debug, Clone)]
pub struct StructureOptions {
    /// Marker acceptance heuristic
    pub numbering: NumberingPolicy,

    /// Treat a declared answer as the end of a question, so the next page
    /// cannot continue it
    pub close_on_answer: bool,

    /// Drop page-number lines at the top and bottom of each page
    pub strip_page_numbers: bool,
}

impl StructureOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the numbering policy.
    pub fn with_numbering(mut self, policy: NumberingPolicy) -> Self {
        self.numbering = policy;
        self
    }

    /// Accept every numbering marker.
    pub fn any_numbering(mut self) -> Self {
        self.numbering = NumberingPolicy::Any;
        self
    }

    /// Enable or disable closing questions on a declared answer.
    pub fn with_close_on_answer(mut self, close: bool) -> Self {
        self.close_on_answer = close;
        self
    }

    /// Enable or disable page-number stripping.
    pub fn with_strip_page_numbers(mut self, strip: bool) -> Self {
        self.strip_page_numbers = strip;
        self
    }
}

impl Default for StructureOptions {
    fn default() -> Self {
        Self {
            numbering: NumberingPolicy::default(),
            close_on_answer: true,
            strip_page_numbers: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increasing_policy() {
        let policy = NumberingPolicy::Increasing { max_gap: 3 };
        assert!(policy.accepts(7, None));
        assert!(policy.accepts(5, Some(4)));
        assert!(policy.accepts(7, Some(4)));
        assert!(!policy.accepts(8, Some(4)));
        assert!(!policy.accepts(4, Some(4)));
        assert!(!policy.accepts(2, Some(4)));
        assert!(!policy.accepts(0, None));
    }

    #[test]
    fn test_any_policy() {
        assert!(NumberingPolicy::Any.accepts(1, Some(30)));
        assert!(!NumberingPolicy::Any.accepts(0, Some(30)));
    }

    #[test]
    fn test_options_builder() {
        let options = StructureOptions::new()
            .any_numbering()
            .with_close_on_answer(false)
            .with_strip_page_numbers(false);
        assert_eq!(options.numbering, NumberingPolicy::Any);
        assert!(!options.close_on_answer);
        assert!(!options.strip_page_numbers);

        let defaults = StructureOptions::default();
        assert_eq!(
            defaults.numbering,
            NumberingPolicy::Increasing { max_gap: 10 }
        );
        assert!(defaults.close_on_answer);
    }
}
