use crate::matcher::serialize_pairs;
use crate::model::{Question, QuestionKind};

/// Per-question input buffers: typed text, a selected option and formed pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerDraft {
    text: String,
    selected_option: Option<String>,
    pairs: Vec<(String, String)>,
}

impl AnswerDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn select_option(&mut self, option: impl Into<String>) {
        self.selected_option = Some(option.into());
    }

    /// Pair `left` with `right`. Re-pairing `left` keeps its original position.
    pub fn pair(&mut self, left: impl Into<String>, right: impl Into<String>) {
        let left = left.into();
        let right = right.into();
        match self.pairs.iter_mut().find(|(l, _)| *l == left) {
            Some(existing) => existing.1 = right,
            None => self.pairs.push((left, right)),
        }
    }

    /// Drop the pair starting at `left`. Returns whether one was removed.
    pub fn unpair(&mut self, left: &str) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|(l, _)| l != left);
        self.pairs.len() != before
    }

    pub fn clear_pairs(&mut self) {
        self.pairs.clear();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether the draft holds enough input to check against `question`.
    ///
    /// Speak questions are never checkable; they can only be skipped.
    #[must_use]
    pub fn is_submittable(&self, question: &Question) -> bool {
        match question.kind() {
            kind if kind.uses_options() && question.has_options() => {
                self.selected_option.is_some()
            }
            QuestionKind::Translate
            | QuestionKind::FillBlank
            | QuestionKind::SelectWord
            | QuestionKind::ListenType => !self.text.trim().is_empty(),
            QuestionKind::MatchPairs => !self.pairs.is_empty(),
            QuestionKind::Speak => false,
        }
    }

    /// The answer text sent to the matcher and the answer recorder.
    #[must_use]
    pub fn submission(&self, question: &Question) -> String {
        match question.kind() {
            kind if kind.uses_options() && question.has_options() => {
                self.selected_option.clone().unwrap_or_default()
            }
            QuestionKind::Translate
            | QuestionKind::FillBlank
            | QuestionKind::SelectWord
            | QuestionKind::ListenType => self.text.trim().to_owned(),
            QuestionKind::MatchPairs => serialize_pairs(&self.pairs),
            QuestionKind::Speak => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn question(kind: QuestionKind, options: &[&str]) -> Question {
        Question::new(QuestionId::new(1), kind, "prompt", "answer").with_options(options.to_vec())
    }

    #[test]
    fn option_kinds_need_a_selection_when_options_exist() {
        let q = question(QuestionKind::SelectWord, &["a", "b"]);
        let mut draft = AnswerDraft::new();
        draft.set_text("typed but ignored");
        assert!(!draft.is_submittable(&q));

        draft.select_option("b");
        assert!(draft.is_submittable(&q));
        assert_eq!(draft.submission(&q), "b");
    }

    #[test]
    fn option_kinds_fall_back_to_text_without_options() {
        let q = question(QuestionKind::Translate, &[]);
        let mut draft = AnswerDraft::new();
        draft.set_text("   ");
        assert!(!draft.is_submittable(&q));

        draft.set_text("  the cat ");
        assert!(draft.is_submittable(&q));
        assert_eq!(draft.submission(&q), "the cat");
    }

    #[test]
    fn listen_type_always_uses_text() {
        let q = question(QuestionKind::ListenType, &["ignored"]);
        let mut draft = AnswerDraft::new();
        draft.select_option("ignored");
        assert!(!draft.is_submittable(&q));

        draft.set_text("hola");
        assert_eq!(draft.submission(&q), "hola");
    }

    #[test]
    fn speak_is_never_submittable() {
        let q = question(QuestionKind::Speak, &[]);
        let mut draft = AnswerDraft::new();
        draft.set_text("hola");
        assert!(!draft.is_submittable(&q));
    }

    #[test]
    fn match_pairs_need_one_pair_and_keep_first_position_on_repair() {
        let q = question(QuestionKind::MatchPairs, &[]);
        let mut draft = AnswerDraft::new();
        assert!(!draft.is_submittable(&q));

        draft.pair("cat", "perro");
        draft.pair("dog", "perro");
        draft.pair("cat", "gato");
        assert!(draft.is_submittable(&q));
        assert_eq!(draft.submission(&q), "cat-gato,dog-perro");

        assert!(draft.unpair("cat"));
        assert!(!draft.unpair("cat"));
        assert_eq!(draft.submission(&q), "dog-perro");
    }

    #[test]
    fn clear_empties_every_buffer() {
        let mut draft = AnswerDraft::new();
        draft.set_text("x");
        draft.select_option("y");
        draft.pair("a", "b");
        draft.clear();
        assert_eq!(draft, AnswerDraft::default());
    }
}
