// src/handlers/quiz.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        question::PublicQuestion,
        quiz_config::QuizView,
        quiz_result::{QuizResult, SubmitQuizRequest},
    },
    results, scoring, session,
    state::AppState,
    utils::jwt::Claims,
};

/// Returns the quiz as a taker sees it: title, availability, and the
/// questions with the answer key stripped. Outside the availability window
/// the question list stays empty.
pub async fn get_quiz(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let config = state.quiz_config();
    let available = config.is_available_at(Utc::now());

    let questions: Vec<PublicQuestion> = if available {
        config.questions.iter().map(PublicQuestion::from).collect()
    } else {
        Vec::new()
    };

    Ok(Json(QuizView {
        title: config.title,
        available,
        questions,
    }))
}

/// Grades a submission against the current bank and appends the result.
///
/// Scoring is whole-point: one point per fully-correct answer, with the
/// percentage and score-out-of-10 derived from the same pair. Submitting
/// also marks the email as completed, which is what blocks repeat attempts
/// at the name step.
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = state.quiz_config();
    if !config.is_available_at(Utc::now()) {
        return Err(AppError::Conflict(
            "The quiz is not currently available".to_string(),
        ));
    }
    if config.questions.is_empty() {
        return Err(AppError::BadRequest(
            "No questions are configured".to_string(),
        ));
    }

    let user = session::find_user(state.durable.as_ref(), &claims.sub)
        .ok_or_else(|| AppError::AuthError("Unknown user".to_string()))?;

    let (answers, score) = scoring::grade_submission(&config.questions, &req.answers);
    let total_questions = config.questions.len();

    let result = QuizResult {
        id: Uuid::new_v4().to_string(),
        user_email: user.email.clone(),
        user_name: user.name.clone(),
        answers,
        score,
        total_questions,
        completed_at: Utc::now(),
        time_spent_seconds: req.time_spent_seconds,
    };

    results::save_result(state.durable.as_ref(), &result);
    tracing::info!(
        "Quiz submitted by {}: {}/{} in {}s",
        user.email,
        score,
        total_questions,
        req.time_spent_seconds
    );

    Ok(Json(json!({
        "score": score,
        "total_questions": total_questions,
        "percentage": scoring::percentage(score, total_questions),
        "score_out_of_10": scoring::score_out_of_10(score, total_questions),
        "message": "Quiz submitted successfully",
    })))
}
