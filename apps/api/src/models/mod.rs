pub mod lenient;
pub mod resume;

pub use resume::{ExperienceEntry, ResumeRecord, Section, Skills};
