//! ATS Scoring — deterministic calculator, presentation badge, and the
//! AI narrative that accompanies (but never replaces) the computed score.

pub mod calculator;
pub mod handlers;
pub mod presentation;
pub mod prompts;
pub mod report;

pub use calculator::score;
pub use presentation::{format_score, present, ScoreBadge, ScoreDisplay};
pub use report::{assess, ScoreResult};
