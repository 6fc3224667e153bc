// src/models/quiz_result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single graded answer within a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question_id: String,

    /// The option indices the user picked (sorted, in-range only).
    pub selected: Vec<usize>,

    /// Exact match against the question's correct set.
    pub is_correct: bool,

    /// Overlap fraction in [0, 1]; only interesting for multi-selects,
    /// where a partly-right pick earns part of the credit.
    pub partial_credit: f64,
}

/// One completed attempt. Written exactly once at submission and never
/// mutated afterwards except by explicit administrator deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: String,
    pub user_email: String,
    pub user_name: String,

    /// One entry per bank question, in question order.
    pub answers: Vec<QuizAnswer>,

    /// Whole points: the number of fully-correct answers. Percentage and
    /// the score-out-of-10 are derived from this and `total_questions`,
    /// never stored separately.
    pub score: u32,
    pub total_questions: usize,

    pub completed_at: DateTime<Utc>,
    pub time_spent_seconds: u64,
}

/// DTO: the user's pick for one question.
#[derive(Debug, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub selected: Vec<usize>,
}

/// DTO for submitting a completed quiz.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub answers: Vec<SubmittedAnswer>,
    pub time_spent_seconds: u64,
}

/// Aggregates for the administrator's overview tab.
#[derive(Debug, Serialize)]
pub struct QuizStatistics {
    pub total_submissions: usize,
    /// Mean of the per-result scores normalized to 10.
    pub average_score: f64,
    pub question_stats: Vec<QuestionStats>,
    pub user_stats: Vec<UserStats>,
}

/// Per-question row: how often the current bank's question was answered
/// fully correctly. Answers to since-deleted questions still count toward
/// submission totals but get no row here.
#[derive(Debug, Serialize)]
pub struct QuestionStats {
    pub question_id: String,
    pub prompt: String,
    pub correct_percentage: f64,
    pub total_answers: usize,
}

/// Per-user row for the users tab.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub user_email: String,
    pub user_name: String,
    pub score: u32,
    pub percentage: f64,
    pub time_spent_seconds: u64,
    pub completed_at: DateTime<Utc>,
}
