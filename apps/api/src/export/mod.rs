//! Document export — the current record rendered as PDF or DOCX.

use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use tracing::{error, info};

use crate::models::{ResumeRecord, Skills};

pub mod docx;
pub mod handlers;
pub mod pdf;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("DOCX packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Could not write document: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn builder(&self) -> &'static dyn DocumentBuilder {
        match self {
            ExportFormat::Pdf => &pdf::PdfBuilder,
            ExportFormat::Docx => &docx::DocxBuilder,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            other => Err(format!("unsupported export format '{other}', use pdf or docx")),
        }
    }
}

/// Renders a record into a complete document.
pub trait DocumentBuilder: Send + Sync {
    fn build(&self, record: &ResumeRecord) -> Result<Vec<u8>, ExportError>;
}

/// Builds the document for `format` and writes it to `path`.
/// Returns whether the file was written; failures are logged.
pub fn write_document(record: &ResumeRecord, format: ExportFormat, path: &Path) -> bool {
    let result = format
        .builder()
        .build(record)
        .and_then(|bytes| std::fs::write(path, &bytes).map(|_| bytes.len()).map_err(ExportError::from));
    match result {
        Ok(len) => {
            info!("Wrote {} document ({len} bytes)", format.extension());
            true
        }
        Err(e) => {
            error!("Failed to write {} document: {e}", format.extension());
            false
        }
    }
}

/// One laid-out line of a résumé, shared by every output format.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Contact(String),
    Heading(&'static str),
    /// Bold entry line: job, project, degree.
    Entry(String),
    /// Small italic line under an entry.
    Meta(String),
    Paragraph(String),
    Bullet(String),
}

/// Section order: header, summary, skills, experience, projects, education,
/// certifications, languages. Empty sections are left out.
pub fn layout(record: &ResumeRecord) -> Vec<Block> {
    let mut blocks = Vec::new();

    if !record.name.trim().is_empty() {
        blocks.push(Block::Title(record.name.trim().to_string()));
    }
    let contact: Vec<&str> = [record.email.trim(), record.phone.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !contact.is_empty() {
        blocks.push(Block::Contact(contact.join(" | ")));
    }
    if !record.target_role.trim().is_empty() {
        blocks.push(Block::Contact(format!("Target Role: {}", record.target_role.trim())));
    }

    if !record.professional_summary.trim().is_empty() {
        blocks.push(Block::Heading("PROFESSIONAL SUMMARY"));
        blocks.push(Block::Paragraph(record.professional_summary.trim().to_string()));
    }

    if !record.skills.is_empty() {
        blocks.push(Block::Heading("SKILLS"));
        match &record.skills {
            Skills::List(items) => blocks.push(Block::Paragraph(items.join(", "))),
            Skills::Categorized { technical, soft } => {
                if !technical.is_empty() {
                    blocks.push(Block::Paragraph(format!("Technical: {}", technical.join(", "))));
                }
                if !soft.is_empty() {
                    blocks.push(Block::Paragraph(format!("Soft Skills: {}", soft.join(", "))));
                }
            }
        }
    }

    if !record.experience.is_empty() {
        blocks.push(Block::Heading("PROFESSIONAL EXPERIENCE"));
        for entry in &record.experience {
            blocks.push(Block::Entry(joined(&[entry.title.as_str(), entry.company.as_str()])));
            if !entry.duration.trim().is_empty() {
                blocks.push(Block::Meta(entry.duration.trim().to_string()));
            }
            blocks.extend(entry.bullets().iter().map(|b| Block::Bullet(b.clone())));
        }
    }

    if !record.projects.is_empty() {
        blocks.push(Block::Heading("PROJECTS"));
        for project in &record.projects {
            blocks.push(Block::Entry(project.name.clone()));
            if !project.technologies.is_empty() {
                blocks.push(Block::Meta(format!(
                    "Technologies: {}",
                    project.technologies.join(", ")
                )));
            }
            if !project.description.trim().is_empty() {
                blocks.push(Block::Paragraph(project.description.trim().to_string()));
            }
            blocks.extend(project.achievements.iter().map(|a| Block::Bullet(a.clone())));
        }
    }

    if !record.education.is_empty() {
        blocks.push(Block::Heading("EDUCATION"));
        for entry in &record.education {
            blocks.push(Block::Entry(joined(&[entry.degree.as_str(), entry.institution.as_str()])));
            let gpa = entry.gpa.as_deref().map(|g| format!("GPA: {g}")).unwrap_or_default();
            let meta = joined(&[entry.year.as_str(), gpa.as_str()]);
            if !meta.is_empty() {
                blocks.push(Block::Meta(meta));
            }
        }
    }

    if !record.certifications.is_empty() {
        blocks.push(Block::Heading("CERTIFICATIONS"));
        blocks.extend(record.certifications.iter().map(|c| Block::Bullet(c.clone())));
    }

    if !record.languages.is_empty() {
        blocks.push(Block::Heading("LANGUAGES"));
        blocks.push(Block::Paragraph(record.languages.join(", ")));
    }

    blocks
}

fn joined(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Download file name derived from the candidate's name.
pub fn file_name(record: &ResumeRecord, format: ExportFormat) -> String {
    let slug: String = record
        .name
        .split_whitespace()
        .map(|part| {
            part.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let stem = if slug.is_empty() { "resume".to_string() } else { format!("{slug}_resume") };
    format!("{stem}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::EducationEntry;
    use crate::models::ExperienceEntry;

    fn record() -> ResumeRecord {
        ResumeRecord {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            target_role: "Analyst".into(),
            skills: Skills::Categorized {
                technical: vec!["SQL".into()],
                soft: vec![],
            },
            experience: vec![ExperienceEntry {
                title: "Analyst".into(),
                company: "Initech".into(),
                achievements: vec!["Cut report time by 40%".into()],
                ..Default::default()
            }],
            education: vec![EducationEntry {
                degree: "BSc".into(),
                year: "2018".into(),
                gpa: Some("3.8".into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_layout_order_and_omissions() {
        let blocks = layout(&record());
        assert_eq!(
            blocks,
            vec![
                Block::Title("Jane Doe".into()),
                Block::Contact("jane@example.com".into()),
                Block::Contact("Target Role: Analyst".into()),
                Block::Heading("SKILLS"),
                Block::Paragraph("Technical: SQL".into()),
                Block::Heading("PROFESSIONAL EXPERIENCE"),
                Block::Entry("Analyst | Initech".into()),
                Block::Bullet("Cut report time by 40%".into()),
                Block::Heading("EDUCATION"),
                Block::Entry("BSc".into()),
                Block::Meta("2018 | GPA: 3.8".into()),
            ]
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<ExportFormat>(), Ok(ExportFormat::Pdf));
        assert_eq!("docx".parse::<ExportFormat>(), Ok(ExportFormat::Docx));
        assert!("doc".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(&record(), ExportFormat::Pdf), "Jane_Doe_resume.pdf");
        assert_eq!(
            file_name(&ResumeRecord::default(), ExportFormat::Docx),
            "resume.docx"
        );
    }

    #[test]
    fn test_write_document_reports_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        assert!(write_document(&record(), ExportFormat::Docx, &path));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        let missing_dir = dir.path().join("nope").join("out.pdf");
        assert!(!write_document(&record(), ExportFormat::Pdf, &missing_dir));
    }
}
