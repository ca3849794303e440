use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::calculator::{self, ScoreBreakdown};
use super::prompts::{NARRATIVE_OPTIONS, SCORE_FEEDBACK_PROMPT_TEMPLATE};
use crate::llm_client::prompts::{job_description_block, pretty_json, JSON_ONLY_SYSTEM};
use crate::llm_client::{call_json, ChatDelegate};
use crate::models::{lenient, ResumeRecord};

/// The five narrative categories, each 0–100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    #[serde(default, deserialize_with = "lenient::score")]
    pub content: u8,
    #[serde(default, deserialize_with = "lenient::score")]
    pub format: u8,
    #[serde(default, deserialize_with = "lenient::score")]
    pub optimization: u8,
    #[serde(default, deserialize_with = "lenient::score")]
    pub best_practices: u8,
    #[serde(default, deserialize_with = "lenient::score")]
    pub application_ready: u8,
}

impl CategoryScores {
    fn uniform(score: u8) -> Self {
        Self {
            content: score,
            format: score,
            optimization: score,
            best_practices: score,
            application_ready: score,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    Error,
    Warning,
    #[default]
    Info,
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "error" | "critical" | "high" => Severity::Error,
            "warning" | "medium" => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub detail: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub section: String,
}

/// Improvements grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Improvements {
    #[serde(default, deserialize_with = "lenient::entry_list")]
    pub content: Vec<Improvement>,
    #[serde(default, deserialize_with = "lenient::entry_list")]
    pub format: Vec<Improvement>,
    #[serde(default, deserialize_with = "lenient::entry_list")]
    pub optimization: Vec<Improvement>,
    #[serde(default, deserialize_with = "lenient::entry_list")]
    pub best_practices: Vec<Improvement>,
    #[serde(default, deserialize_with = "lenient::entry_list")]
    pub application_ready: Vec<Improvement>,
}

impl Improvements {
    pub fn len(&self) -> usize {
        self.content.len()
            + self.format.len()
            + self.optimization.len()
            + self.best_practices.len()
            + self.application_ready.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubScore {
    pub score: u8,
    pub max: u8,
}

/// What the model contributes to a score. Any overall score it sends is ignored.
#[derive(Debug, Deserialize)]
struct NarrativeFeedback {
    #[serde(default)]
    category_scores: Option<CategoryScores>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Improvements,
    #[serde(default, deserialize_with = "lenient::string_list")]
    missing_keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    pub overall_score: u8,
    pub category_scores: CategoryScores,
    pub breakdown: BTreeMap<String, SubScore>,
    pub strengths: Vec<String>,
    pub improvements: Improvements,
    pub missing_keywords: Vec<String>,
    pub summary: String,
    pub last_updated: DateTime<Utc>,
}

impl ScoreResult {
    fn base(breakdown: &ScoreBreakdown) -> Self {
        let table = breakdown
            .components()
            .into_iter()
            .map(|(name, score, max)| (name.to_string(), SubScore { score, max }))
            .collect();
        let overall = breakdown.total();
        Self {
            overall_score: overall,
            category_scores: CategoryScores::uniform(overall),
            breakdown: table,
            strengths: Vec::new(),
            improvements: Improvements::default(),
            missing_keywords: Vec::new(),
            summary: String::new(),
            last_updated: Utc::now(),
        }
    }

    /// Result used when no narrative is available.
    pub fn fallback(breakdown: &ScoreBreakdown, has_job_description: bool) -> Self {
        let mut result = Self::base(breakdown);
        if !has_job_description {
            result.category_scores.optimization = result.overall_score / 2;
        }
        result.strengths = vec!["Resume structure is present".to_string()];
        result.summary = format!(
            "Resume scored {}/100. Further analysis unavailable.",
            result.overall_score
        );
        result
    }

    fn with_narrative(
        breakdown: &ScoreBreakdown,
        narrative: NarrativeFeedback,
        has_job_description: bool,
    ) -> Self {
        let mut result = Self::base(breakdown);
        result.category_scores = narrative
            .category_scores
            .unwrap_or_else(|| Self::fallback(breakdown, has_job_description).category_scores);
        result.strengths = narrative.strengths;
        result.improvements = narrative.improvements;
        result.missing_keywords = narrative.missing_keywords;
        result.summary = if narrative.summary.trim().is_empty() {
            format!("Resume scored {}/100.", result.overall_score)
        } else {
            narrative.summary
        };
        result
    }
}

/// Full score for a record: the deterministic total plus the model's narrative.
/// The narrative is optional; when the delegate fails the deterministic
/// fallback is returned instead.
pub async fn assess(
    delegate: &dyn ChatDelegate,
    record: &ResumeRecord,
    job_description: &str,
) -> ScoreResult {
    let breakdown = calculator::breakdown(record, job_description);
    let has_job_description = !job_description.trim().is_empty();

    let prompt = SCORE_FEEDBACK_PROMPT_TEMPLATE
        .replace("{base_score}", &breakdown.total().to_string())
        .replace("{target_role}", &record.target_role)
        .replace("{resume_json}", &pretty_json(record))
        .replace("{jd_block}", &job_description_block(job_description));

    match call_json::<NarrativeFeedback>(delegate, &prompt, JSON_ONLY_SYSTEM, NARRATIVE_OPTIONS)
        .await
    {
        Ok(narrative) => {
            let result = ScoreResult::with_narrative(&breakdown, narrative, has_job_description);
            info!(
                "Scored resume: {} ({} improvements)",
                result.overall_score,
                result.improvements.len()
            );
            result
        }
        Err(e) => {
            warn!("Score narrative unavailable, using fallback: {e}");
            ScoreResult::fallback(&breakdown, has_job_description)
        }
    }
}
