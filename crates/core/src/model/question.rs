use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("unknown question type: {0}")]
    UnknownKind(String),
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// Interaction type of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Translate a sentence, either typed or picked from options.
    Translate,
    /// Fill the blank in the prompt.
    FillBlank,
    /// Type what the audio says.
    ListenType,
    /// Say the prompt aloud. Can only be skipped.
    Speak,
    /// Pair items from two columns.
    MatchPairs,
    /// Pick the right word.
    SelectWord,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Translate => "translate",
            QuestionKind::FillBlank => "fill_blank",
            QuestionKind::ListenType => "listen_type",
            QuestionKind::Speak => "speak",
            QuestionKind::MatchPairs => "match_pairs",
            QuestionKind::SelectWord => "select_word",
        }
    }

    /// Whether the kind answers through a selected option when options are present.
    #[must_use]
    pub fn uses_options(self) -> bool {
        matches!(
            self,
            QuestionKind::Translate | QuestionKind::FillBlank | QuestionKind::SelectWord
        )
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "translate" => Ok(Self::Translate),
            "fill_blank" => Ok(Self::FillBlank),
            "listen_type" => Ok(Self::ListenType),
            "speak" => Ok(Self::Speak),
            "match_pairs" => Ok(Self::MatchPairs),
            "select_word" => Ok(Self::SelectWord),
            other => Err(QuestionError::UnknownKind(other.to_owned())),
        }
    }
}

//
// ─── WORD TRANSLATION ──────────────────────────────────────────────────────────
//

/// Hover translation for a single prompt word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTranslation {
    pub translation: String,
    pub part_of_speech: Option<String>,
}

impl WordTranslation {
    #[must_use]
    pub fn new(translation: impl Into<String>, part_of_speech: Option<String>) -> Self {
        Self {
            translation: translation.into(),
            part_of_speech,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single lesson question as delivered by the question source.
///
/// Immutable once built; the session only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    instruction: String,
    prompt: String,
    correct_answer: String,
    options: Vec<String>,
    audio: Option<String>,
    image: Option<String>,
    explanation: Option<String>,
    vocabulary_word: Option<String>,
    word_translations: HashMap<String, WordTranslation>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        kind: QuestionKind,
        prompt: impl Into<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            instruction: String::new(),
            prompt: prompt.into(),
            correct_answer: correct_answer.into(),
            options: Vec::new(),
            audio: None,
            image: None,
            explanation: None,
            vocabulary_word: None,
            word_translations: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_audio(mut self, audio: impl Into<String>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Blank explanations are dropped.
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        let explanation = explanation.into();
        self.explanation = (!explanation.trim().is_empty()).then_some(explanation);
        self
    }

    #[must_use]
    pub fn with_vocabulary_word(mut self, word: impl Into<String>) -> Self {
        let word = word.into();
        self.vocabulary_word = (!word.trim().is_empty()).then_some(word);
        self
    }

    /// Lookup keys are lowercased on the way in.
    #[must_use]
    pub fn with_word_translations<I, K>(mut self, translations: I) -> Self
    where
        I: IntoIterator<Item = (K, WordTranslation)>,
        K: AsRef<str>,
    {
        self.word_translations = translations
            .into_iter()
            .map(|(word, t)| (word.as_ref().to_lowercase(), t))
            .collect();
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    #[must_use]
    pub fn audio(&self) -> Option<&str> {
        self.audio.as_deref()
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn vocabulary_word(&self) -> Option<&str> {
        self.vocabulary_word.as_deref()
    }

    /// Translation for a word, matched case-insensitively.
    #[must_use]
    pub fn translation_for(&self, word: &str) -> Option<&WordTranslation> {
        if self.word_translations.is_empty() {
            return None;
        }
        self.word_translations.get(&word.to_lowercase())
    }

    #[must_use]
    pub fn has_word_translations(&self) -> bool {
        !self.word_translations.is_empty()
    }
}
