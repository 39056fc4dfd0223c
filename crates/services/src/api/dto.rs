use std::collections::HashMap;

use lesson_core::model::{Question, QuestionId, QuestionKind, WordTranslation};
use serde::{Deserialize, Serialize};

use super::LessonCompletion;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionDto {
    id: u64,
    question_type: String,
    #[serde(default)]
    task_instruction: Option<String>,
    prompt: String,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    options: Option<Vec<OptionDto>>,
    #[serde(default)]
    audio: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    vocabulary_word: Option<String>,
    #[serde(default, alias = "wordTranslations")]
    word_translations: Option<HashMap<String, WordTranslationDto>>,
}

#[derive(Debug, Deserialize)]
struct OptionDto {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WordTranslationDto {
    translation: String,
    #[serde(default, alias = "partOfSpeech")]
    part_of_speech: Option<String>,
}

impl QuestionDto {
    pub(crate) fn into_question(self) -> Result<Question, ApiError> {
        let kind: QuestionKind = self.question_type.parse()?;
        let mut question = Question::new(
            QuestionId::new(self.id),
            kind,
            self.prompt,
            self.correct_answer.unwrap_or_default(),
        )
        .with_instruction(self.task_instruction.unwrap_or_default())
        .with_explanation(self.explanation.unwrap_or_default())
        .with_vocabulary_word(self.vocabulary_word.unwrap_or_default());

        if let Some(options) = self.options {
            question = question.with_options(options.into_iter().map(|o| o.text));
        }
        if let Some(audio) = self.audio.filter(|a| !a.is_empty()) {
            question = question.with_audio(audio);
        }
        if let Some(image) = self.image.filter(|i| !i.is_empty()) {
            question = question.with_image(image);
        }
        if let Some(translations) = self.word_translations {
            question = question.with_word_translations(
                translations
                    .into_iter()
                    .map(|(word, t)| (word, WordTranslation::new(t.translation, t.part_of_speech))),
            );
        }
        Ok(question)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitAnswerRequest<'a> {
    pub answer: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompleteLessonRequest {
    stars_earned: u8,
    questions_completed: u32,
    questions_correct: u32,
    xp_earned: u32,
}

impl From<&LessonCompletion> for CompleteLessonRequest {
    fn from(c: &LessonCompletion) -> Self {
        Self {
            stars_earned: c.stars_earned,
            questions_completed: c.questions_completed,
            questions_correct: c.questions_correct,
            xp_earned: c.xp_earned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::LessonId;

    #[test]
    fn maps_full_question_payload() {
        let json = r#"{
            "id": 17,
            "question_type": "select_word",
            "task_instruction": "Pick the word",
            "prompt": "El ___ duerme",
            "correct_answer": "gato",
            "options": [{"text": "gato"}, {"text": "perro"}],
            "audio": "",
            "image": "https://cdn.example.com/cat.png",
            "explanation": "Gato means cat.",
            "vocabulary_word": "gato",
            "word_translations": {"Duerme": {"translation": "sleeps", "part_of_speech": "verb"}}
        }"#;
        let dto: QuestionDto = serde_json::from_str(json).unwrap();
        let q = dto.into_question().unwrap();

        assert_eq!(q.id(), QuestionId::new(17));
        assert_eq!(q.kind(), QuestionKind::SelectWord);
        assert_eq!(q.instruction(), "Pick the word");
        assert_eq!(q.options(), ["gato".to_owned(), "perro".to_owned()]);
        assert_eq!(q.audio(), None);
        assert_eq!(q.image(), Some("https://cdn.example.com/cat.png"));
        assert_eq!(q.explanation(), Some("Gato means cat."));
        assert_eq!(q.vocabulary_word(), Some("gato"));
        assert_eq!(
            q.translation_for("duerme").and_then(|t| t.part_of_speech.as_deref()),
            Some("verb")
        );
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let json = r#"{"id": 1, "question_type": "speak", "prompt": "Hola"}"#;
        let q = serde_json::from_str::<QuestionDto>(json)
            .unwrap()
            .into_question()
            .unwrap();

        assert_eq!(q.correct_answer(), "");
        assert_eq!(q.instruction(), "");
        assert!(!q.has_options());
        assert_eq!(q.explanation(), None);
        assert!(!q.has_word_translations());
    }

    #[test]
    fn unknown_question_type_fails_decoding() {
        let json = r#"{"id": 1, "question_type": "essay", "prompt": "Write"}"#;
        let err = serde_json::from_str::<QuestionDto>(json)
            .unwrap()
            .into_question()
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn completion_request_uses_backend_field_names() {
        let completion = LessonCompletion {
            lesson_id: LessonId::new(5),
            stars_earned: 3,
            questions_completed: 5,
            questions_correct: 3,
            xp_earned: 30,
        };
        let json = serde_json::to_value(CompleteLessonRequest::from(&completion)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "stars_earned": 3,
                "questions_completed": 5,
                "questions_correct": 3,
                "xp_earned": 30
            })
        );
    }
}
