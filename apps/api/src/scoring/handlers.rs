use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::scoring::{assess, present, ScoreDisplay};
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct ScoreRequest {
    /// Replaces the job description remembered on the session when present.
    #[serde(default)]
    pub job_description: Option<String>,
}

/// POST /api/v1/sessions/:id/score
pub async fn handle_score(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<ScoreRequest>>,
) -> Result<Json<ScoreDisplay>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    if let Some(jd) = req.job_description {
        session.job_description = jd.trim().to_string();
    }

    let result = assess(
        state.llm.as_ref(),
        session.editor.current(),
        &session.job_description,
    )
    .await;
    let display = present(&result);
    session.last_score = Some(result);
    Ok(Json(display))
}
