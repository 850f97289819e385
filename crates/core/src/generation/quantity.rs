//! Detection of an explicit item count in a topic ("10 ways to ...").

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Nouns that mark a number as a requested item count.
pub const UNIT_NOUNS: [&str; 17] = [
    "questions",
    "items",
    "tips",
    "ways",
    "steps",
    "examples",
    "ideas",
    "points",
    "things",
    "reasons",
    "secrets",
    "hacks",
    "tricks",
    "methods",
    "strategies",
    "techniques",
    "facts",
];

static QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(\d+)\s+({})\b", UNIT_NOUNS.join("|"))).unwrap()
});

static QA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bquestions?\s*(and|or|&|/)\s*answers?\b|\bq\s*(&|and)\s*a\b").unwrap()
});

/// Structural constraint derived from the topic text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantitySpec {
    /// Exact number of main items requested, if the topic names one.
    pub requested_quantity: Option<usize>,
    /// Whether each item should be a question and answer pair.
    pub is_qa_format: bool,
}

impl QuantitySpec {
    /// A spec that imposes no count.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn exactly(count: usize) -> Self {
        Self {
            requested_quantity: Some(count),
            is_qa_format: false,
        }
    }

    pub fn qa(count: usize) -> Self {
        Self {
            requested_quantity: Some(count),
            is_qa_format: true,
        }
    }
}

/// Scan a topic for `<integer> <unit-noun>`.
///
/// Only the first match counts. A count of zero or one too large for
/// `usize` is treated as no match. Q&A format needs either a counted
/// "questions" or an explicit questions-and-answers phrase; the word
/// "question" alone is not enough.
pub fn extract_quantity(subject: &str) -> QuantitySpec {
    let caps = QUANTITY_RE.captures(subject);

    let requested_quantity = caps
        .as_ref()
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .filter(|n| *n > 0);

    let counted_questions = requested_quantity.is_some()
        && caps
            .as_ref()
            .and_then(|c| c.get(2))
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case("questions"));

    QuantitySpec {
        requested_quantity,
        is_qa_format: counted_questions || QA_RE.is_match(subject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ways_list() {
        let spec = extract_quantity("10 ways to save money");
        assert_eq!(spec.requested_quantity, Some(10));
        assert!(!spec.is_qa_format);
    }

    #[test]
    fn test_questions_and_answers() {
        let spec = extract_quantity("5 questions and answers about sleep");
        assert_eq!(spec, QuantitySpec::qa(5));
    }

    #[test]
    fn test_plain_questions_is_qa() {
        for n in [1usize, 3, 12, 100] {
            let spec = extract_quantity(&format!("{} questions about the ocean", n));
            assert_eq!(spec.requested_quantity, Some(n));
            assert!(spec.is_qa_format, "{} questions should be Q&A", n);
        }
    }

    #[test]
    fn test_case_insensitive() {
        let spec = extract_quantity("7 SECRETS Of Productive People");
        assert_eq!(spec.requested_quantity, Some(7));
    }

    #[test]
    fn test_first_match_wins() {
        let spec = extract_quantity("3 tips and 8 tricks for chess");
        assert_eq!(spec.requested_quantity, Some(3));
    }

    #[test]
    fn test_every_unit_noun_matches() {
        for noun in UNIT_NOUNS {
            let spec = extract_quantity(&format!("Top 4 {} for beginners", noun));
            assert_eq!(spec.requested_quantity, Some(4), "noun: {}", noun);
        }
    }

    #[test]
    fn test_no_match_is_unconstrained() {
        for subject in [
            "How to save money",
            "The history of 1984",
            "10 minutes of relaxing rain",
            "2024 in review",
            "100waysnospace",
            "",
        ] {
            let spec = extract_quantity(subject);
            assert_eq!(spec.requested_quantity, None, "subject: {:?}", subject);
        }
    }

    #[test]
    fn test_number_must_precede_noun() {
        assert_eq!(extract_quantity("ways to save 10").requested_quantity, None);
    }

    #[test]
    fn test_zero_is_ignored() {
        assert_eq!(extract_quantity("0 tips").requested_quantity, None);
    }

    #[test]
    fn test_single_word_question_is_not_qa() {
        let spec = extract_quantity("10 tips for answering any interview question");
        assert_eq!(spec, QuantitySpec::exactly(10));

        assert!(!extract_quantity("The question of free will").is_qa_format);
        assert!(!extract_quantity("5 ways to ask better questions").is_qa_format);
    }

    #[test]
    fn test_qa_without_count() {
        let spec = extract_quantity("Q&A session on gardening");
        assert_eq!(spec.requested_quantity, None);
        assert!(spec.is_qa_format);
    }
}
