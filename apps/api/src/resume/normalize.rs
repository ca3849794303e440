use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::AppError;
use crate::models::{ResumeRecord, Section};

/// What normalization had to drop on the way to a [`ResumeRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeReport {
    /// Top-level keys outside the record schema. Reported, never stored.
    pub quarantined_keys: Vec<String>,
    /// Sections whose value had the wrong shape and were reset to empty.
    pub unreadable_sections: Vec<Section>,
}

impl NormalizeReport {
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.quarantined_keys.is_empty() {
            warnings.push(format!(
                "Ignored unknown fields: {}",
                self.quarantined_keys.join(", ")
            ));
        }
        if !self.unreadable_sections.is_empty() {
            let names: Vec<&str> = self.unreadable_sections.iter().map(Section::as_str).collect();
            warnings.push(format!(
                "Could not read these sections, they were left empty: {}",
                names.join(", ")
            ));
        }
        warnings
    }
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub record: ResumeRecord,
    pub report: NormalizeReport,
}

/// Builds a record with every key present. Missing keys default to `""` or `[]`;
/// skills keep whichever shape they arrived in.
pub fn normalize_with_report(raw: &Map<String, Value>) -> Normalized {
    let mut record = ResumeRecord::default();
    let mut report = NormalizeReport::default();

    for (key, value) in raw {
        let section = match Section::from_key(key) {
            // The "summary" alias only fills in when the canonical key is absent.
            Some(Section::ProfessionalSummary)
                if key != Section::ProfessionalSummary.as_str()
                    && raw.contains_key(Section::ProfessionalSummary.as_str()) =>
            {
                continue;
            }
            Some(section) => section,
            None => {
                report.quarantined_keys.push(key.clone());
                continue;
            }
        };

        if let Err(e) = record.replace_section(section, value.clone()) {
            warn!("Section {section} unreadable, left empty: {e}");
            report.unreadable_sections.push(section);
        }
    }

    if !report.quarantined_keys.is_empty() {
        warn!("Quarantined unknown keys: {:?}", report.quarantined_keys);
    }
    Normalized { record, report }
}

/// Boundary form of [`normalize_with_report`] for untrusted JSON.
pub fn normalize_value(raw: &Value) -> Result<Normalized, AppError> {
    match raw {
        Value::Object(map) => Ok(normalize_with_report(map)),
        _ => Err(AppError::Validation(
            "resume must be a JSON object".to_string(),
        )),
    }
}

/// Checks that a manually entered record has enough to generate from.
pub fn check_completeness(record: &ResumeRecord) -> Result<(), AppError> {
    let required = [
        (Section::Name, "name"),
        (Section::Email, "email"),
        (Section::Phone, "phone"),
        (Section::TargetRole, "target role"),
    ];
    if let Some((_, label)) = required
        .iter()
        .find(|(section, _)| record.is_section_empty(*section))
    {
        return Err(AppError::Validation(format!("{label} is required")));
    }

    let has_content = [Section::Skills, Section::Experience, Section::Education]
        .into_iter()
        .any(|section| !record.is_section_empty(section));
    if !has_content {
        return Err(AppError::Validation(
            "add at least one of skills, experience or education".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Skills;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn normalize(raw: &Map<String, Value>) -> ResumeRecord {
        normalize_with_report(raw).record
    }

    #[test]
    fn test_missing_keys_default() {
        let record = normalize(&object(json!({"name": "Jane"})));
        assert_eq!(record.name, "Jane");
        assert_eq!(record.email, "");
        assert!(record.experience.is_empty());
        assert_eq!(record.skills, Skills::List(vec![]));
    }

    #[test]
    fn test_summary_alias() {
        let record = normalize(&object(json!({"summary": "Seasoned analyst."})));
        assert_eq!(record.professional_summary, "Seasoned analyst.");

        let record = normalize(&object(json!({
            "summary": "alias",
            "professional_summary": "canonical"
        })));
        assert_eq!(record.professional_summary, "canonical");
    }

    #[test]
    fn test_unknown_keys_quarantined() {
        let normalized = normalize_with_report(&object(json!({
            "name": "Jane",
            "keywords": ["sql"],
            "hobbies": "chess"
        })));
        assert_eq!(normalized.report.quarantined_keys, vec!["hobbies", "keywords"]);
        let json = serde_json::to_value(&normalized.record).unwrap();
        assert!(json.get("keywords").is_none());
        assert_eq!(normalized.report.warnings().len(), 1);
    }

    #[test]
    fn test_skills_shape_preserved() {
        let record = normalize(&object(json!({
            "skills": {"technical": ["SQL", "Go"], "soft": ["Leadership"]}
        })));
        assert!(matches!(record.skills, Skills::Categorized { .. }));
        assert_eq!(record.skills.count(), 3);
    }

    #[test]
    fn test_lenient_field_shapes() {
        let record = normalize(&object(json!({
            "phone": 5550100,
            "certifications": "AWS Solutions Architect",
            "languages": [{"name": "English"}, "Spanish"]
        })));
        assert_eq!(record.phone, "5550100");
        assert_eq!(record.certifications, vec!["AWS Solutions Architect"]);
        assert_eq!(record.languages, vec!["English", "Spanish"]);
    }

    #[test]
    fn test_unreadable_section_reported() {
        let normalized = normalize_with_report(&object(json!({
            "experience": "Ten years at Acme"
        })));
        assert!(normalized.record.experience.is_empty());
        assert_eq!(normalized.report.unreadable_sections, vec![Section::Experience]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = object(json!({
            "name": "Jane Doe",
            "summary": "Analyst.",
            "skills": {"technical": ["SQL"]},
            "experience": [{"title": "Analyst", "company": "Initech", "duration": 2020,
                            "achievements": ["Saved $5k"], "location": "Remote"}],
            "education": [{"degree": "BSc", "institution": "State", "year": "2018"}],
            "projects": [{"name": "Dash", "technologies": "Tableau"}],
            "languages": "English",
            "extra_key": true
        }));
        let once = normalize(&raw);
        let serialized = object(serde_json::to_value(&once).unwrap());
        let twice = normalize(&serialized);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_value_rejects_non_object() {
        assert!(matches!(
            normalize_value(&json!(["not", "a", "record"])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_completeness() {
        let mut record = ResumeRecord {
            name: "Jane".into(),
            email: "jane@example.com".into(),
            phone: "555".into(),
            target_role: "Analyst".into(),
            ..Default::default()
        };
        assert!(check_completeness(&record).is_err());
        record.skills = Skills::List(vec!["SQL".into()]);
        assert!(check_completeness(&record).is_ok());
        record.phone = "  ".into();
        let err = check_completeness(&record).unwrap_err();
        assert!(err.to_string().contains("phone"));
    }
}
