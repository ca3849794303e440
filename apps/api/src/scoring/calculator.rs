use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::models::{ExperienceEntry, ResumeRecord};

/// Quantified-achievement markers: 30%, 10+, $500, 2x.
static METRIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+%|\d+\+|\$\d+|\d+x").expect("valid regex"));

pub const CONTACT_MAX: u8 = 10;
pub const SUMMARY_MAX: u8 = 15;
pub const SKILLS_MAX: u8 = 20;
pub const EXPERIENCE_MAX: u8 = 10;
pub const ACHIEVEMENTS_MAX: u8 = 15;
pub const EDUCATION_MAX: u8 = 10;
pub const PROJECTS_MAX: u8 = 10;
pub const KEYWORDS_MAX: u8 = 10;

/// Points awarded when no job description is supplied.
const NO_JOB_DESCRIPTION_POINTS: u8 = 5;

/// The additive components of the deterministic ATS score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub contact: u8,
    pub summary: u8,
    pub skills: u8,
    pub experience: u8,
    pub achievements: u8,
    pub education: u8,
    pub projects: u8,
    pub keywords: u8,
}

impl ScoreBreakdown {
    /// Sum of all components, clamped to 0–100.
    pub fn total(&self) -> u8 {
        let sum: u32 = self.components().iter().map(|(_, score, _)| u32::from(*score)).sum();
        sum.min(100) as u8
    }

    /// `(name, score, max)` for every component, in display order.
    pub fn components(&self) -> [(&'static str, u8, u8); 8] {
        [
            ("contact", self.contact, CONTACT_MAX),
            ("summary", self.summary, SUMMARY_MAX),
            ("skills", self.skills, SKILLS_MAX),
            ("experience", self.experience, EXPERIENCE_MAX),
            ("achievements", self.achievements, ACHIEVEMENTS_MAX),
            ("education", self.education, EDUCATION_MAX),
            ("projects", self.projects, PROJECTS_MAX),
            ("keywords", self.keywords, KEYWORDS_MAX),
        ]
    }
}

/// Deterministic 0–100 ATS score. Pure: identical inputs always give identical scores.
pub fn score(record: &ResumeRecord, job_description: &str) -> u8 {
    breakdown(record, job_description).total()
}

pub fn breakdown(record: &ResumeRecord, job_description: &str) -> ScoreBreakdown {
    ScoreBreakdown {
        contact: contact_points(record),
        summary: summary_points(&record.professional_summary),
        skills: skill_points(record.skills.count()),
        experience: experience_points(record.experience.len()),
        achievements: achievement_points(&record.experience),
        education: if record.education.is_empty() { 0 } else { EDUCATION_MAX },
        projects: project_points(record.projects.len()),
        keywords: keyword_points(record, job_description),
    }
}

fn contact_points(record: &ResumeRecord) -> u8 {
    let mut points = 0;
    if !record.name.is_empty() {
        points += 3;
    }
    if record.email.contains('@') {
        points += 4;
    }
    if !record.phone.is_empty() {
        points += 3;
    }
    points
}

fn summary_points(summary: &str) -> u8 {
    if summary.is_empty() {
        return 0;
    }
    match summary.split_whitespace().count() {
        20..=100 => 15,
        10..=19 | 101..=150 => 10,
        _ => 5,
    }
}

fn skill_points(count: usize) -> u8 {
    match count {
        c if c >= 10 => 20,
        c if c >= 5 => 15,
        c if c >= 3 => 10,
        c if c > 0 => 5,
        _ => 0,
    }
}

fn experience_points(entries: usize) -> u8 {
    entries.saturating_mul(3).min(usize::from(EXPERIENCE_MAX)) as u8
}

fn achievement_points(experience: &[ExperienceEntry]) -> u8 {
    let serialized = serde_json::to_string(experience).unwrap_or_default();
    match count_metrics(&serialized) {
        n if n >= 5 => 15,
        n if n >= 3 => 10,
        n if n >= 1 => 5,
        _ => 0,
    }
}

/// Number of quantified-achievement matches in `text`.
pub fn count_metrics(text: &str) -> usize {
    METRIC_PATTERN.find_iter(text).count()
}

fn project_points(entries: usize) -> u8 {
    match entries {
        n if n >= 3 => 10,
        n if n >= 1 => 5,
        _ => 0,
    }
}

fn keyword_points(record: &ResumeRecord, job_description: &str) -> u8 {
    if job_description.trim().is_empty() {
        return NO_JOB_DESCRIPTION_POINTS;
    }

    let haystack = serde_json::to_string(record)
        .unwrap_or_default()
        .to_lowercase();
    let lowered = job_description.to_lowercase();
    let tokens: HashSet<&str> = lowered.split_whitespace().collect();
    let matches = tokens
        .iter()
        .filter(|token| token.chars().count() > 3 && haystack.contains(**token))
        .count();

    match matches {
        n if n >= 20 => 10,
        n if n >= 10 => 7,
        n if n >= 5 => 4,
        _ => 0,
    }
}
