// src/results.rs

//! Result list, the completed-users set, and the derived statistics for the
//! administrator view.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::bank;
use crate::models::quiz_result::{QuestionStats, QuizResult, QuizStatistics, UserStats};
use crate::scoring;
use crate::store::{self, COMPLETED_KEY, KeyValueStore, RESULTS_KEY};

/// Appends the result and marks the email as completed, so the gate holds
/// system-wide from this moment on.
pub fn save_result(store: &dyn KeyValueStore, result: &QuizResult) {
    let mut results = get_results(store);
    results.push(result.clone());
    store::write_json(store, RESULTS_KEY, &results);
    mark_completed(store, &result.user_email);
}

pub fn get_results(store: &dyn KeyValueStore) -> Vec<QuizResult> {
    store::read_json(store, RESULTS_KEY).unwrap_or_default()
}

pub fn has_completed(store: &dyn KeyValueStore, email: &str) -> bool {
    completed_users(store).iter().any(|e| e == email)
}

pub fn completed_users(store: &dyn KeyValueStore) -> Vec<String> {
    store::read_json(store, COMPLETED_KEY).unwrap_or_default()
}

/// Idempotent: adding an email twice has no extra effect.
pub fn mark_completed(store: &dyn KeyValueStore, email: &str) {
    let mut completed = completed_users(store);
    if !completed.iter().any(|e| e == email) {
        completed.push(email.to_string());
        store::write_json(store, COMPLETED_KEY, &completed);
    }
}

/// Removes one result by id. Returns false when the id is unknown.
pub fn delete_result(store: &dyn KeyValueStore, id: &str) -> bool {
    let mut results = get_results(store);
    let before = results.len();
    results.retain(|r| r.id != id);
    if results.len() == before {
        return false;
    }
    store::write_json(store, RESULTS_KEY, &results);
    true
}

/// Clears the result list AND the completed-users set, making every user
/// eligible to retake the quiz.
pub fn delete_all_results(store: &dyn KeyValueStore) {
    store.remove(RESULTS_KEY);
    store.remove(COMPLETED_KEY);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Score,
    Percentage,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Derives the overview, per-question and per-user statistics from the full
/// result list and the current question bank.
///
/// Question rows join each result's answers by question id against the
/// bank: a result that references a since-deleted question still counts in
/// the totals but gets no per-question row. User rows are sorted by the
/// requested field; the sort is stable.
pub fn compute_statistics(
    store: &dyn KeyValueStore,
    sort_by: SortField,
    order: SortOrder,
) -> QuizStatistics {
    let results = get_results(store);
    let config = bank::get_config(store);

    let total_submissions = results.len();
    let average_score = if total_submissions == 0 {
        0.0
    } else {
        results
            .iter()
            .map(|r| scoring::score_out_of_10(r.score, r.total_questions))
            .sum::<f64>()
            / total_submissions as f64
    };

    let question_stats = config
        .questions
        .iter()
        .map(|question| {
            let answered: Vec<_> = results
                .iter()
                .filter_map(|r| r.answers.iter().find(|a| a.question_id == question.id))
                .collect();
            let correct = answered.iter().filter(|a| a.is_correct).count();
            QuestionStats {
                question_id: question.id.clone(),
                prompt: question.prompt.clone(),
                correct_percentage: if answered.is_empty() {
                    0.0
                } else {
                    correct as f64 / answered.len() as f64 * 100.0
                },
                total_answers: answered.len(),
            }
        })
        .collect();

    let mut user_stats: Vec<UserStats> = results
        .iter()
        .map(|r| UserStats {
            user_email: r.user_email.clone(),
            user_name: r.user_name.clone(),
            score: r.score,
            percentage: scoring::percentage(r.score, r.total_questions),
            time_spent_seconds: r.time_spent_seconds,
            completed_at: r.completed_at,
        })
        .collect();

    user_stats.sort_by(|a, b| {
        let ordering = match sort_by {
            SortField::Name => a
                .user_name
                .to_lowercase()
                .cmp(&b.user_name.to_lowercase()),
            SortField::Score => a.score.cmp(&b.score),
            SortField::Percentage => a
                .percentage
                .partial_cmp(&b.percentage)
                .unwrap_or(Ordering::Equal),
            SortField::Time => a.time_spent_seconds.cmp(&b.time_spent_seconds),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    QuizStatistics {
        total_submissions,
        average_score,
        question_stats,
        user_stats,
    }
}
