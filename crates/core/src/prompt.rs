//! Splits a question prompt into renderable segments with hover translations.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Question, QuestionKind, WordTranslation};

static TOKEN_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+|[.,!?;:"()]+"#).expect("token pattern is valid"));

static BLANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_+|\{blank\}").expect("blank pattern is valid"));

/// One piece of a prompt as the presentation layer draws it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSegment<'a> {
    Space(&'a str),
    Punctuation(&'a str),
    /// Input slot of a fill-in-blank prompt.
    Blank,
    Word {
        text: &'a str,
        translation: Option<&'a WordTranslation>,
        /// The word is the question's vocabulary token.
        highlighted: bool,
    },
}

/// Segment the prompt of `question`.
///
/// Blanks are only recognised for fill-in-blank questions.
#[must_use]
pub fn prompt_segments(question: &Question) -> Vec<PromptSegment<'_>> {
    let prompt = question.prompt();
    let vocab = question.vocabulary_word().and_then(vocabulary_pattern);
    let mut out = Vec::new();

    let pieces = if question.kind() == QuestionKind::FillBlank {
        split_keep(&BLANK, prompt)
    } else {
        vec![(false, prompt)]
    };

    for (is_blank, piece) in pieces {
        if is_blank {
            out.push(PromptSegment::Blank);
            continue;
        }
        match &vocab {
            Some(re) => {
                for (is_vocab, part) in split_keep(re, piece) {
                    if is_vocab {
                        out.push(PromptSegment::Word {
                            text: part,
                            translation: question.translation_for(part),
                            highlighted: true,
                        });
                    } else {
                        push_tokens(question, part, &mut out);
                    }
                }
            }
            None => push_tokens(question, piece, &mut out),
        }
    }
    out
}

fn vocabulary_pattern(word: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word.trim()))).ok()
}

fn push_tokens<'a>(question: &'a Question, text: &'a str, out: &mut Vec<PromptSegment<'a>>) {
    for (is_boundary, token) in split_keep(&TOKEN_BOUNDARY, text) {
        if !is_boundary {
            out.push(PromptSegment::Word {
                text: token,
                translation: question.translation_for(token),
                highlighted: false,
            });
        } else if token.chars().all(char::is_whitespace) {
            out.push(PromptSegment::Space(token));
        } else {
            out.push(PromptSegment::Punctuation(token));
        }
    }
}

/// Split `text` on `re`, keeping the matches. Empty pieces are dropped.
fn split_keep<'a>(re: &Regex, text: &'a str) -> Vec<(bool, &'a str)> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            out.push((false, &text[last..m.start()]));
        }
        if !m.as_str().is_empty() {
            out.push((true, m.as_str()));
        }
        last = m.end();
    }
    if last < text.len() {
        out.push((false, &text[last..]));
    }
    out
}
