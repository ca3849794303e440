use serde_json::Value;
use tracing::{info, warn};

use super::normalize::normalize_value;
use super::prompts::{
    GENERATE_PROMPT_TEMPLATE, GENERATION_OPTIONS, STRUCTURE_PROMPT_TEMPLATE, STRUCTURING_OPTIONS,
};
use crate::errors::llm_hint;
use crate::llm_client::prompts::{job_description_block, pretty_json, JSON_ONLY_SYSTEM};
use crate::llm_client::{call_json, ChatDelegate};
use crate::models::{ResumeRecord, Section};

const HINT_MANUAL_ENTRY: &str = "Fill in the details manually or try a different file.";
const HINT_TRY_AGAIN: &str = "Try again; your entered details are unchanged.";

/// Sections the generator may rewrite. Identity fields always stay the user's.
const GENERATED_SECTIONS: [Section; 6] = [
    Section::ProfessionalSummary,
    Section::Skills,
    Section::Experience,
    Section::Education,
    Section::Projects,
    Section::Certifications,
];

/// A record plus anything the user should know about how it was produced.
#[derive(Debug, Clone)]
pub struct Structured {
    pub record: ResumeRecord,
    pub warnings: Vec<String>,
}

/// Turns extracted résumé text into a record. A delegate failure yields an
/// empty record aimed at `target_role` instead of an error.
pub async fn structure_resume(
    delegate: &dyn ChatDelegate,
    text: &str,
    target_role: &str,
) -> Structured {
    let prompt = STRUCTURE_PROMPT_TEMPLATE
        .replace("{target_role}", target_role)
        .replace("{resume_text}", text);

    let raw = match call_json::<Value>(delegate, &prompt, JSON_ONLY_SYSTEM, STRUCTURING_OPTIONS).await
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Structuring failed, starting from a minimal record: {e}");
            return minimal_with_warning(
                target_role,
                format!(
                    "The resume could not be read automatically ({e}). {}",
                    llm_hint(&e, HINT_MANUAL_ENTRY)
                ),
            );
        }
    };

    let normalized = match normalize_value(&raw) {
        Ok(normalized) => normalized,
        Err(e) => {
            warn!("Structuring returned a non-object, starting from a minimal record: {e}");
            return minimal_with_warning(
                target_role,
                format!("The resume could not be read automatically. {HINT_MANUAL_ENTRY}"),
            );
        }
    };

    let mut record = normalized.record;
    if record.target_role.trim().is_empty() {
        record.target_role = target_role.to_string();
    }
    info!(
        "Structured resume: {} experience entries, {} skills",
        record.experience.len(),
        record.skills.count()
    );
    Structured {
        record,
        warnings: normalized.report.warnings(),
    }
}

fn minimal_with_warning(target_role: &str, warning: String) -> Structured {
    Structured {
        record: ResumeRecord::minimal(target_role),
        warnings: vec![warning],
    }
}

/// Asks the delegate for ATS-optimized content built from the user's record.
/// On failure the user's record comes back unchanged with a warning.
pub async fn generate_content(
    delegate: &dyn ChatDelegate,
    user: &ResumeRecord,
    job_description: &str,
) -> Structured {
    let target_role = if user.target_role.trim().is_empty() {
        "Not specified"
    } else {
        user.target_role.as_str()
    };
    let prompt = GENERATE_PROMPT_TEMPLATE
        .replace("{target_role}", target_role)
        .replace("{jd_block}", &job_description_block(job_description))
        .replace("{user_json}", &pretty_json(user));

    let generated = match call_json::<Value>(delegate, &prompt, JSON_ONLY_SYSTEM, GENERATION_OPTIONS)
        .await
    {
        Ok(raw) => normalize_value(&raw).map_err(|e| (e.to_string(), HINT_TRY_AGAIN)),
        Err(e) => Err((e.to_string(), llm_hint(&e, HINT_TRY_AGAIN))),
    };

    match generated {
        Ok(normalized) => {
            let record = merge_generated(user, normalized.record);
            info!("Generated resume content for {}", record.target_role);
            Structured {
                record,
                warnings: Vec::new(),
            }
        }
        Err((reason, hint)) => {
            warn!("Content generation failed, keeping the entered record: {reason}");
            Structured {
                record: user.clone(),
                warnings: vec![format!(
                    "AI content generation was unavailable ({reason}). {hint}"
                )],
            }
        }
    }
}

/// Generated sections replace the user's only when they are non-empty.
fn merge_generated(user: &ResumeRecord, generated: ResumeRecord) -> ResumeRecord {
    let mut merged = user.clone();
    for section in GENERATED_SECTIONS {
        if generated.is_section_empty(section) {
            continue;
        }
        if let Err(e) = merged.replace_section(section, generated.section_value(section)) {
            warn!("Kept entered {section}, generated value unusable: {e}");
        }
    }
    merged
}
