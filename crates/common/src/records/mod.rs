//! FAQ record types and canonicalization
//!
//! A `FaqRecord` is one question/answer pair from the corpus. The
//! canonicalized document text is the fixed derived string that gets
//! embedded and later serves as the join key from reranked texts back to
//! records, so its format must never change between index build and query
//! time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Template prefix for the question part of the canonicalized text
pub const DOCUMENT_QUESTION_PREFIX: &str = "Вопрос:";

/// Template prefix for the answer part of the canonicalized text
pub const DOCUMENT_ANSWER_PREFIX: &str = "Ответ:";

/// One FAQ entry: a question, its answer, and optional topic tags.
///
/// Identity is positional: the i-th record corresponds to the i-th
/// embedding in the index artifact. Missing fields deserialize to empty
/// values rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRecord {
    /// Question text from the corpus
    #[serde(default)]
    pub question: String,

    /// Answer text from the corpus
    #[serde(default)]
    pub answer: String,

    /// Optional topic tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
}

impl FaqRecord {
    /// Create a record without tags
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            tags: None,
        }
    }

    /// The canonicalized document text that gets embedded.
    ///
    /// Combines question and answer into a single document, which retrieves
    /// better than the question alone.
    pub fn document_text(&self) -> String {
        format!(
            "{} {} {} {}",
            DOCUMENT_QUESTION_PREFIX, self.question, DOCUMENT_ANSWER_PREFIX, self.answer
        )
    }
}
