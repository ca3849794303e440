use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::models::lenient;

/// One top-level key of a [`ResumeRecord`]. This is the closed key set every
/// edit and every normalized input is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Name,
    Email,
    Phone,
    TargetRole,
    ProfessionalSummary,
    Skills,
    Experience,
    Education,
    Projects,
    Certifications,
    Languages,
}

impl Section {
    pub const ALL: [Section; 11] = [
        Section::Name,
        Section::Email,
        Section::Phone,
        Section::TargetRole,
        Section::ProfessionalSummary,
        Section::Skills,
        Section::Experience,
        Section::Education,
        Section::Projects,
        Section::Certifications,
        Section::Languages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Name => "name",
            Section::Email => "email",
            Section::Phone => "phone",
            Section::TargetRole => "target_role",
            Section::ProfessionalSummary => "professional_summary",
            Section::Skills => "skills",
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Projects => "projects",
            Section::Certifications => "certifications",
            Section::Languages => "languages",
        }
    }

    /// Resolves a key as written by a person or a model ("Target Role",
    /// "target-role", "summary") to its canonical section.
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized = key.trim().to_lowercase().replace([' ', '-'], "_");
        if normalized == "summary" {
            return Some(Section::ProfessionalSummary);
        }
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == normalized)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Skills arrive either as a flat list or as a `technical`/`soft` mapping.
/// Both shapes are legitimate; consumers branch on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Skills {
    List(Vec<String>),
    Categorized {
        technical: Vec<String>,
        soft: Vec<String>,
    },
}

impl Default for Skills {
    fn default() -> Self {
        Skills::List(Vec::new())
    }
}

impl Skills {
    /// Flat list length, or technical + soft for the mapping variant.
    pub fn count(&self) -> usize {
        match self {
            Skills::List(items) => items.len(),
            Skills::Categorized { technical, soft } => technical.len() + soft.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

impl<'de> Deserialize<'de> for Skills {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(map) if map.contains_key("technical") || map.contains_key("soft") => {
                let list = |key: &str| {
                    lenient::string_list(map.get(key).cloned().unwrap_or(Value::Null))
                        .map_err(D::Error::custom)
                };
                Ok(Skills::Categorized {
                    technical: list("technical")?,
                    soft: list("soft")?,
                })
            }
            // Some other grouping ("languages", "tools", ...): keep every skill as a flat list.
            Value::Object(map) => {
                let mut items = Vec::new();
                for value in map.into_values() {
                    items.extend(lenient::string_list(value).map_err(D::Error::custom)?);
                }
                Ok(Skills::List(items))
            }
            other => lenient::string_list(other)
                .map(Skills::List)
                .map_err(D::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub duration: String,
    #[serde(
        default,
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub responsibilities: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub achievements: Vec<String>,
    /// Fields outside the schema (location, team size, ...) carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExperienceEntry {
    /// Parsed résumés use `responsibilities`, generated ones `achievements`.
    pub fn bullets(&self) -> &[String] {
        if self.responsibilities.is_empty() {
            &self.achievements
        } else {
            &self.responsibilities
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub year: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub gpa: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub achievements: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The canonical structured résumé. Every key is always present once built;
/// absence is represented by `""` or an empty list, never by a missing field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub target_role: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub professional_summary: String,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default, deserialize_with = "lenient::entry_list")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "lenient::entry_list")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "lenient::entry_list")]
    pub projects: Vec<ProjectEntry>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub languages: Vec<String>,
}

impl ResumeRecord {
    /// An empty record that only knows which role it is aimed at.
    pub fn minimal(target_role: &str) -> Self {
        Self {
            target_role: target_role.to_string(),
            ..Self::default()
        }
    }

    /// Replaces one section wholesale with `content`. No merge happens inside the
    /// section, and no other field is touched. Content that cannot be read as
    /// the section's type leaves the record unchanged.
    pub fn replace_section(&mut self, section: Section, content: Value) -> Result<(), serde_json::Error> {
        match section {
            Section::Name => self.name = lenient::string(content)?,
            Section::Email => self.email = lenient::string(content)?,
            Section::Phone => self.phone = lenient::string(content)?,
            Section::TargetRole => self.target_role = lenient::string(content)?,
            Section::ProfessionalSummary => self.professional_summary = lenient::string(content)?,
            Section::Skills => self.skills = Skills::deserialize(content)?,
            Section::Experience => self.experience = lenient::entry_list(content)?,
            Section::Education => self.education = lenient::entry_list(content)?,
            Section::Projects => self.projects = lenient::entry_list(content)?,
            Section::Certifications => self.certifications = lenient::string_list(content)?,
            Section::Languages => self.languages = lenient::string_list(content)?,
        }
        Ok(())
    }

    /// The JSON form of a single section.
    pub fn section_value(&self, section: Section) -> Value {
        let value = match section {
            Section::Name => serde_json::to_value(&self.name),
            Section::Email => serde_json::to_value(&self.email),
            Section::Phone => serde_json::to_value(&self.phone),
            Section::TargetRole => serde_json::to_value(&self.target_role),
            Section::ProfessionalSummary => serde_json::to_value(&self.professional_summary),
            Section::Skills => serde_json::to_value(&self.skills),
            Section::Experience => serde_json::to_value(&self.experience),
            Section::Education => serde_json::to_value(&self.education),
            Section::Projects => serde_json::to_value(&self.projects),
            Section::Certifications => serde_json::to_value(&self.certifications),
            Section::Languages => serde_json::to_value(&self.languages),
        };
        value.unwrap_or(Value::Null)
    }

    pub fn is_section_empty(&self, section: Section) -> bool {
        match section {
            Section::Name => self.name.trim().is_empty(),
            Section::Email => self.email.trim().is_empty(),
            Section::Phone => self.phone.trim().is_empty(),
            Section::TargetRole => self.target_role.trim().is_empty(),
            Section::ProfessionalSummary => self.professional_summary.trim().is_empty(),
            Section::Skills => self.skills.is_empty(),
            Section::Experience => self.experience.is_empty(),
            Section::Education => self.education.is_empty(),
            Section::Projects => self.projects.is_empty(),
            Section::Certifications => self.certifications.is_empty(),
            Section::Languages => self.languages.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_from_key_variants() {
        assert_eq!(Section::from_key("skills"), Some(Section::Skills));
        assert_eq!(Section::from_key(" Target Role "), Some(Section::TargetRole));
        assert_eq!(Section::from_key("target-role"), Some(Section::TargetRole));
        assert_eq!(Section::from_key("summary"), Some(Section::ProfessionalSummary));
        assert_eq!(Section::from_key("hobbies"), None);
    }

    #[test]
    fn test_section_serde_matches_as_str() {
        for section in Section::ALL {
            let json = serde_json::to_value(section).unwrap();
            assert_eq!(json, section.as_str());
        }
    }

    #[test]
    fn test_skills_flat_list() {
        let skills: Skills = serde_json::from_value(json!(["Rust", "Go"])).unwrap();
        assert_eq!(skills, Skills::List(vec!["Rust".into(), "Go".into()]));
        assert_eq!(skills.count(), 2);
    }

    #[test]
    fn test_skills_mapping_counts_both_lists() {
        let skills: Skills = serde_json::from_value(json!({
            "technical": ["SQL", "Go"],
            "soft": ["Leadership"]
        }))
        .unwrap();
        assert!(matches!(skills, Skills::Categorized { .. }));
        assert_eq!(skills.count(), 3);
    }

    #[test]
    fn test_skills_mapping_missing_soft() {
        let skills: Skills = serde_json::from_value(json!({"technical": ["SQL"]})).unwrap();
        assert_eq!(
            skills,
            Skills::Categorized {
                technical: vec!["SQL".into()],
                soft: vec![]
            }
        );
    }

    #[test]
    fn test_skills_other_grouping_flattens() {
        let skills: Skills =
            serde_json::from_value(json!({"languages": ["Rust"], "tools": ["Docker"]})).unwrap();
        assert_eq!(skills.count(), 2);
        assert!(matches!(skills, Skills::List(_)));
    }

    #[test]
    fn test_skills_mapping_serializes_as_mapping() {
        let skills = Skills::Categorized {
            technical: vec!["Rust".into()],
            soft: vec![],
        };
        assert_eq!(
            serde_json::to_value(&skills).unwrap(),
            json!({"technical": ["Rust"], "soft": []})
        );
    }

    #[test]
    fn test_experience_bullets_fall_back_to_achievements() {
        let entry: ExperienceEntry = serde_json::from_value(json!({
            "title": "Engineer",
            "company": "Acme",
            "duration": "2020 - 2022",
            "achievements": ["Shipped v2"],
            "location": "Remote"
        }))
        .unwrap();
        assert_eq!(entry.bullets(), ["Shipped v2".to_string()]);
        assert_eq!(entry.extra.get("location"), Some(&json!("Remote")));
    }

    #[test]
    fn test_education_lenient_year_and_gpa() {
        let entry: EducationEntry = serde_json::from_value(json!({
            "degree": "BSc",
            "institution": "MIT",
            "year": 2019,
            "gpa": ""
        }))
        .unwrap();
        assert_eq!(entry.year, "2019");
        assert_eq!(entry.gpa, None);
    }

    #[test]
    fn test_record_serializes_every_key() {
        let value = serde_json::to_value(ResumeRecord::default()).unwrap();
        let object = value.as_object().unwrap();
        for section in Section::ALL {
            assert!(object.contains_key(section.as_str()), "missing {section}");
        }
        assert_eq!(object.len(), Section::ALL.len());
    }

    #[test]
    fn test_replace_section_only_touches_target() {
        let mut record = ResumeRecord {
            skills: Skills::List(vec!["Python".into()]),
            experience: vec![ExperienceEntry {
                title: "Analyst".into(),
                company: "Initech".into(),
                duration: "2019".into(),
                responsibilities: vec!["Filed TPS reports".into()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let before = serde_json::to_string(&record.experience).unwrap();

        record
            .replace_section(Section::Skills, json!(["Python", "Rust"]))
            .unwrap();

        assert_eq!(record.skills.count(), 2);
        assert_eq!(serde_json::to_string(&record.experience).unwrap(), before);
    }

    #[test]
    fn test_replace_section_rejects_wrong_shape() {
        let mut record = ResumeRecord::minimal("Engineer");
        let original = record.clone();
        assert!(record
            .replace_section(Section::Experience, json!("Senior Engineer at Acme"))
            .is_err());
        assert_eq!(record, original);
    }

    #[test]
    fn test_section_value_roundtrips_through_replace() {
        let mut record = ResumeRecord::minimal("Engineer");
        record.certifications = vec!["AWS SA".into()];
        let value = record.section_value(Section::Certifications);
        let mut copy = ResumeRecord::default();
        copy.replace_section(Section::Certifications, value).unwrap();
        assert_eq!(copy.certifications, record.certifications);
    }
}
