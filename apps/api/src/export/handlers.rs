use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{file_name, write_document, ExportError, ExportFormat};
use crate::models::ResumeRecord;
use crate::state::AppState;

/// GET /api/v1/sessions/:id/export/:format
pub async fn handle_export(
    State(state): State<AppState>,
    Path((id, format)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    let format: ExportFormat = format.parse().map_err(AppError::Validation)?;

    let record = {
        let session = state.sessions.get(id).await?;
        let session = session.lock().await;
        session.editor.current().clone()
    };

    let download_name = file_name(&record, format);
    let bytes = tokio::task::spawn_blocking(move || export_via_temp_file(&record, format))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("export task failed: {e}")))??;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{download_name}\""),
            ),
        ],
        bytes,
    ))
}

/// Writes the document to a temporary file and reads it back. The file is
/// removed when `staged` drops, whichever way this returns.
fn export_via_temp_file(record: &ResumeRecord, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let staged = tempfile::Builder::new()
        .prefix("resume-export-")
        .suffix(&format!(".{}", format.extension()))
        .tempfile()?;

    if !write_document(record, format, staged.path()) {
        return Err(ExportError::Render(format!(
            "the {} document could not be generated",
            format.extension()
        )));
    }
    let bytes = std::fs::read(staged.path())?;
    staged.close()?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_via_temp_file_returns_document() {
        let record = ResumeRecord::minimal("Engineer");
        let bytes = export_via_temp_file(&record, ExportFormat::Pdf).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let bytes = export_via_temp_file(&record, ExportFormat::Docx).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
