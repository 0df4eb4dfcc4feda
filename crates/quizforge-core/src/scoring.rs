//! Scoring and next-difficulty recommendation.

use std::collections::BTreeMap;

use crate::model::{CanonicalQuestion, QuestionReview, Recommendation};

/// Selected option text keyed by zero-based question position.
pub type SelectedAnswers = BTreeMap<usize, String>;

/// Count positions whose trimmed selection equals the trimmed correct answer.
///
/// Unanswered positions count as mismatches.
pub fn score(questions: &[CanonicalQuestion], selected: &SelectedAnswers) -> u32 {
    questions
        .iter()
        .enumerate()
        .filter(|(i, q)| is_correct(q, selected.get(i)))
        .count() as u32
}

/// Recommend an easier quiz when fewer than half of the questions were right.
pub fn recommend(score: u32, total: usize) -> Recommendation {
    // score < total / 2 without losing the half on odd totals
    if u64::from(score) * 2 < total as u64 {
        Recommendation::Easier
    } else {
        Recommendation::Harder
    }
}

/// Per-question breakdown of an attempt.
pub fn review(questions: &[CanonicalQuestion], selected: &SelectedAnswers) -> Vec<QuestionReview> {
    questions
        .iter()
        .enumerate()
        .map(|(position, q)| {
            let choice = selected.get(&position);
            QuestionReview {
                position,
                prompt_text: q.prompt_text.clone(),
                selected: choice.cloned(),
                correct_answer_text: q.correct_answer_text.clone(),
                is_correct: is_correct(q, choice),
            }
        })
        .collect()
}

fn is_correct(question: &CanonicalQuestion, choice: Option<&String>) -> bool {
    choice.is_some_and(|c| c.trim() == question.correct_answer_text.trim())
}
