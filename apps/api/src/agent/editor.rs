use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::history::EditHistory;
use super::prompts::{
    EDIT_OPTIONS, EDIT_PROMPT_TEMPLATE, FALLBACK_SUGGESTIONS, SUGGESTIONS_PROMPT_TEMPLATE,
    SUGGESTION_OPTIONS,
};
use crate::errors::{llm_hint, HINT_REPHRASE};
use crate::llm_client::prompts::{job_description_block, pretty_json, JSON_ONLY_SYSTEM};
use crate::llm_client::{call_json, ChatDelegate, LlmError};
use crate::models::{lenient, ResumeRecord, Section};

/// One edit proposed by the delegate: the full new value for a single section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructuredEdit {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub section: Option<String>,
    #[serde(default)]
    pub updated_content: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub action: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub explanation: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub change_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditStatus {
    Applied,
    NoChange,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditOutcome {
    pub status: EditStatus,
    pub section: Option<Section>,
    pub change_type: Option<String>,
    pub message: String,
}

impl EditOutcome {
    fn unchanged(status: EditStatus, message: String) -> Self {
        Self {
            status,
            section: None,
            change_type: None,
            message,
        }
    }

    pub fn applied(&self) -> bool {
        self.status == EditStatus::Applied
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UndoOutcome {
    pub undone: bool,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// The editable state of one résumé: snapshots, highlight set, and transcript.
#[derive(Debug, Clone)]
pub struct EditSession {
    history: EditHistory,
    changed_sections: BTreeSet<Section>,
    transcript: Vec<ChatTurn>,
}

impl EditSession {
    pub fn new(record: ResumeRecord) -> Self {
        Self {
            history: EditHistory::new(record),
            changed_sections: BTreeSet::new(),
            transcript: Vec::new(),
        }
    }

    pub fn current(&self) -> &ResumeRecord {
        self.history.current()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn changed_sections(&self) -> &BTreeSet<Section> {
        &self.changed_sections
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Asks the delegate for an edit matching `command` and applies it.
    /// A failed delegate call leaves the record as it was.
    pub async fn apply(
        &mut self,
        delegate: &dyn ChatDelegate,
        command: &str,
        job_description: &str,
    ) -> EditOutcome {
        self.transcript.push(ChatTurn {
            role: ChatRole::User,
            content: command.to_string(),
        });

        let outcome = match propose_edit(delegate, self.current(), command, job_description).await
        {
            Ok(edit) => self.apply_edit(edit),
            Err(e) => {
                warn!("Edit proposal failed: {e}");
                EditOutcome::unchanged(
                    EditStatus::Failed,
                    format!(
                        "Could not process the command ({e}). {}",
                        llm_hint(&e, HINT_REPHRASE)
                    ),
                )
            }
        };

        self.transcript.push(ChatTurn {
            role: ChatRole::Assistant,
            content: outcome.message.clone(),
        });
        outcome
    }

    /// Writes a proposed edit into a new snapshot. Only the named section is
    /// replaced; unknown sections and content of the wrong shape are refused.
    pub fn apply_edit(&mut self, edit: StructuredEdit) -> EditOutcome {
        let (Some(name), Some(content)) = (edit.section.as_deref(), edit.updated_content) else {
            let reason = if edit.explanation.trim().is_empty() {
                "The request did not map to a resume section.".to_string()
            } else {
                edit.explanation
            };
            return EditOutcome::unchanged(
                EditStatus::NoChange,
                format!("No change was made. {reason} Try rephrasing your request."),
            );
        };

        let Some(section) = Section::from_key(name) else {
            warn!("Rejected edit for unknown section '{name}'");
            return EditOutcome::unchanged(
                EditStatus::Rejected,
                format!("'{name}' is not a resume section, so no change was made. Try naming the section to edit."),
            );
        };

        let mut updated = self.current().clone();
        if let Err(e) = updated.replace_section(section, content) {
            warn!("Rejected edit for section {section}: {e}");
            return EditOutcome::unchanged(
                EditStatus::Rejected,
                format!("The proposed {section} content could not be used ({e}), so no change was made. Try rephrasing your request."),
            );
        }

        self.history.push(updated);
        self.changed_sections.insert(section);
        info!(
            "Applied edit to {section} (history depth {})",
            self.history.len()
        );

        let action = if edit.action.trim().is_empty() {
            "Updated resume".to_string()
        } else {
            edit.action
        };
        EditOutcome {
            status: EditStatus::Applied,
            section: Some(section),
            change_type: edit.change_type,
            message: format!("{action}\n\n{}", edit.explanation).trim_end().to_string(),
        }
    }

    /// Steps back one snapshot and clears highlights.
    pub fn undo(&mut self) -> UndoOutcome {
        if self.history.undo().is_some() {
            self.changed_sections.clear();
            info!("Undid last edit (history depth {})", self.history.len());
            UndoOutcome {
                undone: true,
                message: "Undid last change",
            }
        } else {
            UndoOutcome {
                undone: false,
                message: "Nothing to undo",
            }
        }
    }

    pub fn clear_highlights(&mut self) {
        self.changed_sections.clear();
    }
}

pub async fn propose_edit(
    delegate: &dyn ChatDelegate,
    record: &ResumeRecord,
    command: &str,
    job_description: &str,
) -> Result<StructuredEdit, LlmError> {
    let prompt = EDIT_PROMPT_TEMPLATE
        .replace("{resume_json}", &pretty_json(record))
        .replace("{jd_block}", &job_description_block(job_description))
        .replace("{command}", command);
    call_json(delegate, &prompt, JSON_ONLY_SYSTEM, EDIT_OPTIONS).await
}

/// 4–6 improvement suggestions, or a fixed list when the delegate fails.
pub async fn suggest_improvements(
    delegate: &dyn ChatDelegate,
    record: &ResumeRecord,
    job_description: &str,
) -> Vec<String> {
    let prompt = SUGGESTIONS_PROMPT_TEMPLATE
        .replace("{resume_json}", &pretty_json(record))
        .replace("{jd_block}", &job_description_block(job_description));

    let suggestions = call_json::<Value>(delegate, &prompt, JSON_ONLY_SYSTEM, SUGGESTION_OPTIONS)
        .await
        .and_then(|value| lenient::string_list(value).map_err(LlmError::Parse));

    match suggestions {
        Ok(list) if !list.is_empty() => list,
        Ok(_) => {
            warn!("Delegate returned no suggestions, using fallback list");
            fallback_suggestions()
        }
        Err(e) => {
            warn!("Suggestions unavailable, using fallback list: {e}");
            fallback_suggestions()
        }
    }
}

fn fallback_suggestions() -> Vec<String> {
    FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}
