// LLM prompt constants for the edit agent.

use crate::llm_client::CallOptions;

pub const EDIT_OPTIONS: CallOptions = CallOptions::new(0.2, 2000);
pub const SUGGESTION_OPTIONS: CallOptions = CallOptions::new(0.5, 600);

/// Section-scoped edit prompt. Replace `{resume_json}`, `{command}` and
/// `{jd_block}` before sending.
pub const EDIT_PROMPT_TEMPLATE: &str = r#"You are a resume editing assistant. Apply the user's command to exactly ONE section of the resume and leave every other section untouched.

Current resume:
{resume_json}

User command: {command}{jd_block}

Rules:
1. Change only the section the command is about.
2. "Add Python to skills" adds Python and keeps every existing skill in its place.
3. "Make the summary shorter" shortens the existing summary instead of rewriting it.
4. updated_content is the COMPLETE new value of that section, in the same shape as the current value.
5. For "optimize for ATS" requests you may improve wording and keywords but keep the facts.

Return a JSON object with this EXACT schema:
{
  "section": "one of: name, email, phone, target_role, professional_summary, skills, experience, education, projects, certifications, languages",
  "action": "brief description, e.g. Added Python to skills",
  "updated_content": "the complete new value of that section",
  "explanation": "what changed, in one or two sentences",
  "change_type": "add|modify|remove|optimize"
}

If the command cannot be applied, return "section": null and explain why in "explanation"."#;

/// Improvement suggestions prompt. Replace `{resume_json}` and `{jd_block}`.
pub const SUGGESTIONS_PROMPT_TEMPLATE: &str = r#"Analyze this resume and provide 4-6 specific, actionable suggestions for improvement.

Resume:
{resume_json}{jd_block}

Each suggestion should:
1. Be specific and actionable
2. Focus on ATS optimization
3. Include quantifiable metrics where possible

Example: ["Add quantifiable metrics to your achievements (e.g., 'Increased sales by 25%')", "Include more technical keywords related to the target role", "Make the summary more concise (aim for 2-3 sentences)"]

Return ONLY a JSON array of 4-6 strings."#;

/// Returned when the delegate cannot produce suggestions.
pub const FALLBACK_SUGGESTIONS: [&str; 4] = [
    "Add quantifiable achievements with numbers and percentages",
    "Optimize keywords for ATS based on job description",
    "Make professional summary more concise and impactful",
    "Use action verbs to start each bullet point",
];
