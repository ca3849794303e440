// LLM prompt constants for résumé structuring and generation.

use crate::llm_client::CallOptions;

pub const STRUCTURING_OPTIONS: CallOptions = CallOptions::new(0.2, 2500);
pub const GENERATION_OPTIONS: CallOptions = CallOptions::new(0.5, 2500);

/// Extracted-text structuring prompt. Replace `{resume_text}` and `{target_role}`.
pub const STRUCTURE_PROMPT_TEMPLATE: &str = r#"You are an expert resume parser. Extract the information in the resume text below into a JSON object.

Resume text:
{resume_text}

Target role: {target_role}

Return a JSON object with this EXACT schema:
{
  "name": "Full name",
  "email": "Email address",
  "phone": "Phone number",
  "target_role": "{target_role}",
  "professional_summary": "Professional summary or objective (2-4 sentences)",
  "skills": ["skill1", "skill2"],
  "education": [
    {"degree": "Degree name", "institution": "University or college", "year": "Graduation year", "gpa": "GPA if mentioned"}
  ],
  "experience": [
    {"title": "Job title", "company": "Company name", "duration": "Jan 2020 - Dec 2022", "responsibilities": ["bullet 1", "bullet 2"]}
  ],
  "projects": [
    {"name": "Project name", "description": "Brief description", "technologies": ["tech1"], "achievements": ["achievement1"]}
  ],
  "certifications": ["cert1"],
  "languages": ["language1"]
}

Rules:
1. Extract ALL information present in the resume.
2. Use "" or [] for anything that is not in the text. Never invent details.
3. Skills include every technical and soft skill mentioned.
4. Experience includes every bullet point under each role."#;

/// Content generation prompt. Replace `{user_json}`, `{target_role}` and `{jd_block}`.
pub const GENERATE_PROMPT_TEMPLATE: &str = r#"You are an expert resume writer specializing in ATS-optimized resumes. Write a professional, ATS-friendly resume from the information below.

User information:
{user_json}

Target role: {target_role}{jd_block}

Return a JSON object with this EXACT schema:
{
  "professional_summary": "A compelling 3-4 line summary tailored to the target role",
  "skills": {
    "technical": ["skill1", "skill2"],
    "soft": ["skill1", "skill2"]
  },
  "experience": [
    {"title": "Job title", "company": "Company name", "duration": "Duration",
     "achievements": ["Achievement with quantifiable results"]}
  ],
  "education": [
    {"degree": "Degree name", "institution": "Institution name", "year": "Year", "gpa": "GPA if available"}
  ],
  "projects": [
    {"name": "Project name", "description": "Description with impact", "technologies": ["tech1"], "achievements": ["achievement1"]}
  ],
  "certifications": ["cert1"],
  "keywords": ["keyword1"]
}

Guidelines:
1. Use action verbs and quantifiable achievements.
2. Include relevant keywords from the job description.
3. Keep the language professional and concise.
4. Keep every employer, title, date and degree from the user information; do not invent new ones.
5. Ensure all content is relevant to the target role."#;
