use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::editor::ChatTurn;
use crate::agent::{suggest_improvements, EditOutcome, UndoOutcome};
use crate::errors::AppError;
use crate::models::{ResumeRecord, Section};
use crate::scoring::{format_score, present, score, ScoreBadge, ScoreDisplay};
use crate::sessions::Session;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resume: ResumeRecord,
    pub changed_sections: BTreeSet<Section>,
    pub history_len: usize,
    pub can_undo: bool,
    pub job_description: String,
    pub score: ScoreBadge,
    /// Latest full assessment, if one was requested.
    pub last_score: Option<ScoreDisplay>,
    pub transcript: Vec<ChatTurn>,
}

impl SessionView {
    fn of(session: &Session) -> Self {
        let resume = session.editor.current().clone();
        let badge = format_score(i64::from(score(&resume, &session.job_description)));
        Self {
            session_id: session.id,
            created_at: session.created_at,
            resume,
            changed_sections: session.editor.changed_sections().clone(),
            history_len: session.editor.history_len(),
            can_undo: session.editor.can_undo(),
            job_description: session.job_description.clone(),
            score: badge,
            last_score: session.last_score.as_ref().map(present),
            transcript: session.editor.transcript().to_vec(),
        }
    }
}

#[derive(Deserialize)]
pub struct EditRequest {
    pub command: String,
}

#[derive(Serialize)]
pub struct EditResponse {
    pub outcome: EditOutcome,
    pub session: SessionView,
}

#[derive(Serialize)]
pub struct UndoResponse {
    pub outcome: UndoOutcome,
    pub session: SessionView,
}

#[derive(Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let session = session.lock().await;
    Ok(Json(SessionView::of(&session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/edit
pub async fn handle_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<EditResponse>, AppError> {
    let command = req.command.trim();
    if command.is_empty() {
        return Err(AppError::Validation("command must not be empty".to_string()));
    }

    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    let job_description = session.job_description.clone();
    let outcome = session
        .editor
        .apply(state.llm.as_ref(), command, &job_description)
        .await;
    if outcome.applied() {
        session.last_score = None;
    }

    Ok(Json(EditResponse {
        outcome,
        session: SessionView::of(&session),
    }))
}

/// POST /api/v1/sessions/:id/undo
pub async fn handle_undo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UndoResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    let outcome = session.editor.undo();
    if outcome.undone {
        session.last_score = None;
    }
    Ok(Json(UndoResponse {
        outcome,
        session: SessionView::of(&session),
    }))
}

/// POST /api/v1/sessions/:id/highlights/clear
pub async fn handle_clear_highlights(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.editor.clear_highlights();
    Ok(Json(SessionView::of(&session)))
}

/// GET /api/v1/sessions/:id/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let session = session.lock().await;
    let suggestions = suggest_improvements(
        state.llm.as_ref(),
        session.editor.current(),
        &session.job_description,
    )
    .await;
    Ok(Json(SuggestionsResponse { suggestions }))
}
