// LLM prompt constants for the Scoring module.

use crate::llm_client::CallOptions;

pub const NARRATIVE_OPTIONS: CallOptions = CallOptions::new(0.3, 1800);

/// Narrative feedback prompt. Replace `{base_score}`, `{target_role}`,
/// `{resume_json}` and `{jd_block}` before sending.
pub const SCORE_FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are an ATS (Applicant Tracking System) expert reviewing a resume for the role of {target_role}.

An automated check has already scored this resume {base_score}/100. Do not re-score it overall.
Assess it in five categories and explain what to improve.

Resume:
{resume_json}{jd_block}

Return a JSON object with this EXACT schema:
{
  "category_scores": {
    "content": 0,
    "format": 0,
    "optimization": 0,
    "best_practices": 0,
    "application_ready": 0
  },
  "strengths": ["specific strength"],
  "improvements": {
    "content": [{"severity": "error", "message": "short issue", "detail": "how to fix it", "section": "experience"}],
    "format": [],
    "optimization": [],
    "best_practices": [],
    "application_ready": []
  },
  "missing_keywords": ["keyword from the job description absent from the resume"],
  "summary": "two sentence overall assessment"
}

Rules:
- Category scores are integers from 0 to 100.
- severity is exactly one of "error", "warning", "info".
- section is one of: name, email, phone, target_role, professional_summary, skills, experience, education, projects, certifications, languages.
- content: quantified achievements, action verbs, relevance to the role.
- format: consistent structure, no tables or graphics, standard section names.
- optimization: keyword coverage for the role and job description.
- best_practices: concise summary, reverse chronological experience, no personal pronouns.
- application_ready: complete contact details, no placeholders, ready to submit.
- missing_keywords is empty when no job description is given.
"#;
