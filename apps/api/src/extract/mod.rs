//! Document Text Extractor — PDF/DOCX in, plain text or a typed failure out.

use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tempfile::NamedTempFile;
use tracing::{info, warn};

pub mod docx;
pub mod pdf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("File is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("Unsupported file format '{0}'. Upload a PDF or DOCX file.")]
    UnsupportedFormat(String),

    #[error("No text could be extracted from the document")]
    NoTextExtracted,

    #[error("Document is corrupt or encrypted: {0}")]
    CorruptOrEncrypted(String),

    #[error("Could not stage uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::NotFound(_) => "not_found",
            ExtractError::EmptyFile(_) => "empty_file",
            ExtractError::UnsupportedFormat(_) => "unsupported_format",
            ExtractError::NoTextExtracted => "no_text_extracted",
            ExtractError::CorruptOrEncrypted(_) => "corrupt_or_encrypted",
            ExtractError::Io(_) => "io",
        }
    }
}

/// Extracts plain text from a document of a declared kind.
pub fn extract_text(path: &Path, kind: DocumentKind) -> Result<String, ExtractError> {
    let bytes = read_document(path)?;

    let text = match kind {
        DocumentKind::Pdf => pdf::extract(&bytes)?,
        DocumentKind::Docx => docx::extract(&bytes)?,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::NoTextExtracted);
    }

    info!(
        "Extracted {} characters from {} ({})",
        text.chars().count(),
        path.display(),
        kind.extension()
    );
    Ok(text.to_string())
}

/// Writes an uploaded file to a temporary path, extracts it, and removes the
/// file again. Removal happens on every path, including failed extraction.
pub fn extract_upload(file_name: &str, data: Bytes) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_path(Path::new(file_name))
        .ok_or_else(|| ExtractError::UnsupportedFormat(file_name.to_string()))?;
    let staged = stage_upload(kind, &data)?;
    extract_staged(staged, kind)
}

fn stage_upload(kind: DocumentKind, data: &[u8]) -> Result<NamedTempFile, ExtractError> {
    let mut staged = tempfile::Builder::new()
        .prefix("resume-upload-")
        .suffix(&format!(".{}", kind.extension()))
        .tempfile()?;
    staged.write_all(data)?;
    staged.flush()?;
    Ok(staged)
}

fn extract_staged(staged: NamedTempFile, kind: DocumentKind) -> Result<String, ExtractError> {
    let result = extract_text(staged.path(), kind);
    if let Err(e) = staged.close() {
        warn!("Failed to remove staged upload: {e}");
    }
    result
}

fn read_document(path: &Path) -> Result<Vec<u8>, ExtractError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExtractError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(ExtractError::Io(e)),
    };
    if metadata.len() == 0 {
        return Err(ExtractError::EmptyFile(path.to_path_buf()));
    }
    Ok(std::fs::read(path)?)
}
