use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::content::{Difficulty, QuestionType};

/// A question as handed over by an external quiz or categorization provider,
/// already translated out of the provider's own format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NormalizedQuestion {
    #[schema(example = "Which HTTP method is idempotent?")]
    pub title: String,
    pub text: String,
    pub question_type: QuestionType,
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub explanation: Option<String>,
    /// Option texts, in display order. Empty for fill-in-blank questions.
    #[serde(default)]
    pub options: Vec<String>,
    /// For MCQ: the texts of the correct options. For fill-in-blank: accepted answers.
    pub correct_answers: Vec<String>,
    /// Tag names; missing tags are created on import.
    #[serde(default)]
    pub tags: Vec<String>,
    /// The provider's identifier, used to skip re-imports.
    #[schema(example = "842")]
    pub source_id: String,
}

impl NormalizedQuestion {
    /// Whether the option at `index` is listed among the correct answers.
    ///
    /// Matching ignores case and surrounding whitespace.
    pub fn is_correct_option(&self, index: usize) -> bool {
        let Some(option) = self.options.get(index) else {
            return false;
        };
        let option = option.trim();
        self.correct_answers
            .iter()
            .any(|answer| answer.trim().eq_ignore_ascii_case(option))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("question source unavailable: {0}")]
    Unavailable(String),
    #[error("question source returned malformed data: {0}")]
    Malformed(String),
}

/// A provider of normalized questions.
///
/// Implementations own all format translation; the core only ever sees
/// [`NormalizedQuestion`] records.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Stable provider name, stored with every imported question.
    fn name(&self) -> &str;

    /// Fetch up to `limit` questions.
    async fn fetch(&self, limit: usize) -> Result<Vec<NormalizedQuestion>, SourceError>;
}

/// A fixed list of records, used when the records arrive in a request body.
pub struct StaticSource {
    name: String,
    records: Vec<NormalizedQuestion>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, records: Vec<NormalizedQuestion>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

#[async_trait]
impl QuestionSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<NormalizedQuestion>, SourceError> {
        Ok(self.records.iter().take(limit).cloned().collect())
    }
}
