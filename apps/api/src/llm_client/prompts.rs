// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it;
// this file only holds cross-cutting pieces.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant for resume work. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Renders a value as pretty JSON for embedding into a prompt.
pub fn pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Renders the optional job-description block appended to several prompts.
pub fn job_description_block(job_description: &str) -> String {
    let jd = job_description.trim();
    if jd.is_empty() {
        String::new()
    } else {
        format!("\n\nJob Description:\n{jd}")
    }
}
