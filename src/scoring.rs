// src/scoring.rs

use std::collections::BTreeSet;

use crate::models::question::Question;
use crate::models::quiz_result::{QuizAnswer, SubmittedAnswer};

/// Grades one question against the user's selection.
///
/// Single-correct questions are all-or-nothing. Multi-selects earn partial
/// credit proportional to the overlap with the correct set, and count as
/// correct only on an exact match. Out-of-range indices are dropped before
/// grading.
pub fn grade_question(question: &Question, selected: &[usize]) -> QuizAnswer {
    let correct: BTreeSet<usize> = question.correct_answers.iter().copied().collect();
    let chosen: BTreeSet<usize> = selected
        .iter()
        .copied()
        .filter(|i| *i < question.options.len())
        .collect();

    let overlap = chosen.intersection(&correct).count();
    let is_correct = !correct.is_empty() && chosen == correct;
    let partial_credit = if correct.is_empty() {
        0.0
    } else {
        overlap as f64 / correct.len() as f64
    };

    QuizAnswer {
        question_id: question.id.clone(),
        selected: chosen.into_iter().collect(),
        is_correct,
        partial_credit,
    }
}

/// Grades a full submission against the current bank.
///
/// Produces one answer per bank question, in question order; submitted
/// answers for unknown question ids are ignored, and unanswered questions
/// grade as an empty selection. Returns the answers and the whole-point
/// score.
pub fn grade_submission(
    questions: &[Question],
    answers: &[SubmittedAnswer],
) -> (Vec<QuizAnswer>, u32) {
    let graded: Vec<QuizAnswer> = questions
        .iter()
        .map(|q| {
            let selected = answers
                .iter()
                .find(|a| a.question_id == q.id)
                .map(|a| a.selected.as_slice())
                .unwrap_or(&[]);
            grade_question(q, selected)
        })
        .collect();

    let score = graded.iter().filter(|a| a.is_correct).count() as u32;
    (graded, score)
}

pub fn percentage(score: u32, total_questions: usize) -> f64 {
    if total_questions == 0 {
        return 0.0;
    }
    score as f64 / total_questions as f64 * 100.0
}

/// Normalized score out of 10, rounded to one decimal. Derived from the
/// same stored score/total pair as `percentage`.
pub fn score_out_of_10(score: u32, total_questions: usize) -> f64 {
    if total_questions == 0 {
        return 0.0;
    }
    (score as f64 / total_questions as f64 * 100.0).round() / 10.0
}
