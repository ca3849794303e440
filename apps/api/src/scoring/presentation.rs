use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::report::{CategoryScores, Improvements, ScoreResult, SubScore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreCategory {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreCategory {
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => ScoreCategory::Excellent,
            60..=79 => ScoreCategory::Good,
            40..=59 => ScoreCategory::Fair,
            _ => ScoreCategory::Poor,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ScoreCategory::Excellent => "#27ae60",
            ScoreCategory::Good => "#f39c12",
            ScoreCategory::Fair => "#e67e22",
            ScoreCategory::Poor => "#e74c3c",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScoreCategory::Excellent => "Your resume is highly optimized for ATS systems!",
            ScoreCategory::Good => "Your resume is well-optimized with room for improvement.",
            ScoreCategory::Fair => "Your resume needs significant improvements for ATS optimization.",
            ScoreCategory::Poor => "Your resume requires major revisions to pass ATS screening.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBadge {
    pub score: u8,
    pub category: ScoreCategory,
    pub color: &'static str,
    pub message: &'static str,
}

/// Badge for a raw score. The score is clamped again here so that a value
/// from anywhere other than the calculator still lands in 0–100.
pub fn format_score(raw: i64) -> ScoreBadge {
    let score = raw.clamp(0, 100) as u8;
    let category = ScoreCategory::for_score(score);
    ScoreBadge {
        score,
        category,
        color: category.color(),
        message: category.message(),
    }
}

/// A [`ScoreResult`] merged with its presentation badge.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreDisplay {
    #[serde(flatten)]
    pub badge: ScoreBadge,
    pub category_scores: CategoryScores,
    pub breakdown: BTreeMap<String, SubScore>,
    pub strengths: Vec<String>,
    pub improvements: Improvements,
    pub missing_keywords: Vec<String>,
    pub summary: String,
    pub last_updated: DateTime<Utc>,
}

pub fn present(result: &ScoreResult) -> ScoreDisplay {
    ScoreDisplay {
        badge: format_score(i64::from(result.overall_score)),
        category_scores: result.category_scores,
        breakdown: result.breakdown.clone(),
        strengths: result.strengths.clone(),
        improvements: result.improvements.clone(),
        missing_keywords: result.missing_keywords.clone(),
        summary: result.summary.clone(),
        last_updated: result.last_updated,
    }
}
