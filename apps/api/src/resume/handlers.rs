use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::extract_upload;
use crate::models::ResumeRecord;
use crate::resume::normalize::{check_completeness, normalize_value};
use crate::resume::structuring::{generate_content, structure_resume};
use crate::scoring::{format_score, score, ScoreBadge};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateResumeRequest {
    pub resume: Value,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub resume: ResumeRecord,
    pub score: ScoreBadge,
    pub warnings: Vec<String>,
}

/// Fields collected from the parse form.
struct Upload {
    file_name: String,
    data: Bytes,
    target_role: String,
    job_description: String,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut target_role = String::new();
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;
                file = Some((file_name, data));
            }
            "target_role" | "job_description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read {name}: {e}")))?;
                if name == "target_role" {
                    target_role = text.trim().to_string();
                } else {
                    job_description = text.trim().to_string();
                }
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("a 'file' field is required".to_string()))?;
    if target_role.is_empty() {
        return Err(AppError::Validation("target_role is required".to_string()));
    }
    Ok(Upload {
        file_name,
        data,
        target_role,
        job_description,
    })
}

async fn open_session(
    state: &AppState,
    record: ResumeRecord,
    job_description: String,
    warnings: Vec<String>,
) -> SessionCreatedResponse {
    let badge = format_score(i64::from(score(&record, &job_description)));
    let session_id = state
        .sessions
        .create(record.clone(), job_description)
        .await;
    SessionCreatedResponse {
        session_id,
        resume: record,
        score: badge,
        warnings,
    }
}

/// POST /api/v1/resumes/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let upload = read_upload(multipart).await?;
    info!(
        "Parsing upload {} ({} bytes) for {}",
        upload.file_name,
        upload.data.len(),
        upload.target_role
    );

    let file_name = upload.file_name.clone();
    let text = tokio::task::spawn_blocking(move || extract_upload(&file_name, upload.data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    let structured = structure_resume(state.llm.as_ref(), &text, &upload.target_role).await;
    let response = open_session(
        &state,
        structured.record,
        upload.job_description,
        structured.warnings,
    )
    .await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/resumes
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let normalized = normalize_value(&req.resume)?;
    let warnings = normalized.report.warnings();
    let job_description = req.job_description.unwrap_or_default().trim().to_string();
    let response = open_session(&state, normalized.record, job_description, warnings).await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/resumes/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let normalized = normalize_value(&req.resume)?;
    check_completeness(&normalized.record)?;
    let job_description = req.job_description.unwrap_or_default().trim().to_string();

    let generated = generate_content(state.llm.as_ref(), &normalized.record, &job_description).await;
    let mut warnings = normalized.report.warnings();
    warnings.extend(generated.warnings);

    let response = open_session(&state, generated.record, job_description, warnings).await;
    Ok((StatusCode::CREATED, Json(response)))
}
