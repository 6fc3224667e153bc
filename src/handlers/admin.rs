// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    bank,
    deletion::PendingAction,
    error::AppError,
    models::{
        question::QuestionPayload,
        quiz_config::UpdateConfigRequest,
        user::UserIdentity,
    },
    results::{self, SortField, SortOrder},
    session,
    state::AppState,
    utils::html::clean_html,
};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub sort_by: Option<SortField>,
    pub order: Option<SortOrder>,
}

/// Overview, per-question and per-user statistics, recomputed from the
/// stored results on every call. The admin view polls this endpoint.
pub async fn statistics(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stats = results::compute_statistics(
        state.durable.as_ref(),
        params.sort_by.unwrap_or_default(),
        params.order.unwrap_or_default(),
    );
    Ok(Json(stats))
}

/// Lists stored identities with `has_completed_quiz` recomputed from the
/// completed-users set, so the flag is never stale here.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users: Vec<UserIdentity> = session::users(state.durable.as_ref())
        .into_iter()
        .map(|mut u| {
            u.has_completed_quiz = results::has_completed(state.durable.as_ref(), &u.email);
            u
        })
        .collect();
    Ok(Json(users))
}

pub async fn list_results(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(results::get_results(state.durable.as_ref())))
}

pub async fn get_config(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz_config()))
}

/// Updates title, active flag and the scheduling window. The question list
/// is managed through the question endpoints and is preserved here.
pub async fn update_config(
    State(state): State<AppState>,
    Json(payload): Json<UpdateConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    if payload.start_date > payload.end_date {
        return Err(AppError::BadRequest(
            "The start date must not be after the end date".to_string(),
        ));
    }

    let mut config = state.quiz_config();
    config.title = clean_html(payload.title.trim());
    config.is_active = payload.is_active;
    config.start_date = payload.start_date;
    config.end_date = payload.end_date;
    bank::save_config(state.durable.as_ref(), &config);

    Ok(Json(config))
}

/// Full bank, answer key included. Admin only by routing.
pub async fn list_questions(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.quiz_config().questions))
}

fn ensure_correct_answers(payload: &QuestionPayload) -> Result<(), AppError> {
    if payload.correct_answers.is_empty() {
        return Err(AppError::BadRequest(
            "Select at least one correct answer".to_string(),
        ));
    }
    if payload
        .correct_answers
        .iter()
        .any(|i| *i >= payload.options.len())
    {
        return Err(AppError::BadRequest(
            "A correct answer index is out of range".to_string(),
        ));
    }
    Ok(())
}

fn sanitized(payload: QuestionPayload) -> QuestionPayload {
    QuestionPayload {
        prompt: clean_html(payload.prompt.trim()),
        options: payload
            .options
            .iter()
            .map(|o| clean_html(o.trim()))
            .collect(),
        correct_answers: payload.correct_answers,
        category: payload.category.map(|c| clean_html(c.trim())),
    }
}

/// Creates a new quiz question.
/// Admin only.
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<QuestionPayload>,
) -> Result<impl IntoResponse, AppError> {
    // Sanitize first so validation sees exactly what would be stored.
    let payload = sanitized(payload);
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    ensure_correct_answers(&payload)?;

    let question = bank::add_question(state.durable.as_ref(), &payload);
    Ok((StatusCode::CREATED, Json(json!({ "id": question.id }))))
}

/// Replaces a question's content in place; the id is preserved.
/// Admin only.
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<QuestionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let payload = sanitized(payload);
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    ensure_correct_answers(&payload)?;

    if !bank::update_question(state.durable.as_ref(), &id, &payload) {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionKind {
    Question,
    Result,
    AllResults,
}

#[derive(Debug, Deserialize)]
pub struct BeginDeletionRequest {
    pub kind: DeletionKind,
    pub target_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmDeletionRequest {
    pub code: String,
}

/// Starts the confirmation gate for a destructive action and returns the
/// code the operator must re-enter. Nothing is deleted yet.
pub async fn begin_deletion(
    State(state): State<AppState>,
    Json(payload): Json<BeginDeletionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let target_id = |id: Option<String>| {
        id.ok_or_else(|| AppError::BadRequest("target_id is required".to_string()))
    };

    let action = match payload.kind {
        DeletionKind::Question => {
            let id = target_id(payload.target_id)?;
            if !state.quiz_config().questions.iter().any(|q| q.id == id) {
                return Err(AppError::NotFound("Question not found".to_string()));
            }
            PendingAction::Question { id }
        }
        DeletionKind::Result => {
            let id = target_id(payload.target_id)?;
            if !results::get_results(state.durable.as_ref())
                .iter()
                .any(|r| r.id == id)
            {
                return Err(AppError::NotFound("Result not found".to_string()));
            }
            PendingAction::Result { id }
        }
        DeletionKind::AllResults => PendingAction::AllResults,
    };

    let code = state.deletions().begin(action);
    Ok(Json(json!({ "code": code, "stage": "code_shown" })))
}

pub async fn acknowledge_deletion(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    state.deletions().acknowledge()?;
    Ok(Json(json!({ "stage": "awaiting_confirmation" })))
}

/// Executes the pending action when the re-entered code matches exactly.
/// On mismatch the pending action (and its code) survive for a retry.
pub async fn confirm_deletion(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmDeletionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let action = state.deletions().confirm(payload.code.trim())?;

    match &action {
        PendingAction::Question { id } => {
            bank::delete_question(state.durable.as_ref(), id);
            tracing::info!("Question {} deleted after confirmation", id);
        }
        PendingAction::Result { id } => {
            results::delete_result(state.durable.as_ref(), id);
            tracing::info!("Result {} deleted after confirmation", id);
        }
        PendingAction::AllResults => {
            results::delete_all_results(state.durable.as_ref());
            tracing::info!("All results deleted after confirmation");
        }
    }

    Ok(Json(json!({ "stage": "applied" })))
}

pub async fn cancel_deletion(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    state.deletions().cancel();
    Ok(StatusCode::NO_CONTENT)
}
