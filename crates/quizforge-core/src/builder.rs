//! Question model builder.
//!
//! Assembles [`CanonicalQuestion`]s from normalized payload entries and drops
//! any entry that cannot satisfy the canonical invariants.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::model::CanonicalQuestion;
use crate::normalizer::QuizPayload;
use crate::resolver::{entry_id, options_of, resolve_correct_answer, scalar_text};

/// Field names accepted for the question text, in lookup order.
pub const QUESTION_TEXT_FIELDS: &[&str] = &["question", "questionText", "question_text", "prompt"];

/// Why a single entry was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionRejection {
    #[error("question text is empty")]
    EmptyPrompt,
    #[error("needs at least 2 options, found {0}")]
    TooFewOptions(usize),
    #[error("option '{0}' appears more than once")]
    DuplicateOption(String),
    #[error("correct answer could not be resolved")]
    MissingCorrectAnswer,
    #[error("correct answer '{0}' is not one of the options")]
    AnswerNotInOptions(String),
}

/// Build one canonical question from the entry at `index` (zero-based).
pub fn build_question(
    entry: &Value,
    index: usize,
    correct_answer_text: String,
) -> Result<CanonicalQuestion, QuestionRejection> {
    let question_text = QUESTION_TEXT_FIELDS
        .iter()
        .find_map(|field| entry.get(*field).and_then(scalar_text))
        .map(|text| text.trim().to_string())
        .unwrap_or_default();
    let scenario = entry
        .get("scenario")
        .and_then(scalar_text)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    let prompt_text = if scenario.is_empty() || question_text.is_empty() {
        question_text
    } else {
        format!("{scenario}\n\n{question_text}")
    };
    if prompt_text.is_empty() {
        return Err(QuestionRejection::EmptyPrompt);
    }

    let options = options_of(entry);
    if options.len() < 2 {
        return Err(QuestionRejection::TooFewOptions(options.len()));
    }
    let mut seen = HashSet::new();
    if let Some(dupe) = options.iter().find(|o| !seen.insert(o.trim())) {
        return Err(QuestionRejection::DuplicateOption(dupe.clone()));
    }

    if correct_answer_text.is_empty() {
        return Err(QuestionRejection::MissingCorrectAnswer);
    }
    if !options.contains(&correct_answer_text) {
        return Err(QuestionRejection::AnswerNotInOptions(correct_answer_text));
    }

    Ok(CanonicalQuestion {
        id: entry_id(entry).unwrap_or_else(|| format!("Q{}", index + 1)),
        prompt_text,
        options,
        correct_answer_text,
    })
}

/// Build every entry of a payload, silently dropping the ones that fail.
///
/// Entry positions (for id synthesis and answer-key lookup) refer to the
/// payload order, so a dropped entry does not shift the ids of later ones.
pub fn build_questions(payload: &QuizPayload) -> Vec<CanonicalQuestion> {
    payload
        .questions
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let correct = resolve_correct_answer(entry, index, &payload.answer_key);
            match build_question(entry, index, correct) {
                Ok(question) => Some(question),
                Err(reason) => {
                    tracing::debug!(index, %reason, "dropping question entry");
                    None
                }
            }
        })
        .collect()
}
